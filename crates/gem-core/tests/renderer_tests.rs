// Host-side tests for the scene renderer, driven through recording doubles
// for the GPU backend, the shader build service and the status surfaces.

use gem_core::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct BackendLog {
    buffers: Vec<(String, usize, u32)>,
    frames: Vec<Option<(u32, FrameUniforms)>>,
    released: Vec<u32>,
    clear_colors: Vec<[f32; 4]>,
}

struct RecordingBackend {
    log: Rc<RefCell<BackendLog>>,
}

impl RenderBackend for RecordingBackend {
    type Buffer = usize;
    type Program = u32;
    type Error = ();

    fn create_vertex_buffer(&mut self, label: &str, vertices: &[f32], components: u32) -> usize {
        let mut log = self.log.borrow_mut();
        log.buffers
            .push((label.to_string(), vertices.len(), components));
        log.buffers.len() - 1
    }

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.log.borrow_mut().clear_colors.push(rgba);
    }

    fn render(&mut self, draw: Option<DrawCall<'_, usize, u32>>) -> Result<(), ()> {
        let frame = draw.map(|d| {
            assert_eq!(d.vertex_count, 36);
            assert_eq!(*d.buffer, 0);
            (*d.program, d.uniforms)
        });
        self.log.borrow_mut().frames.push(frame);
        Ok(())
    }

    fn release_program(&mut self, program: u32) {
        self.log.borrow_mut().released.push(program);
    }
}

#[derive(Default)]
struct ManualBuilder {
    pending: RefCell<Vec<(ShaderRequest, Completion<u32>)>>,
}

impl ManualBuilder {
    fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    fn request(&self, index: usize) -> ShaderRequest {
        self.pending.borrow()[index].0.clone()
    }

    fn resolve(&self, index: usize, result: Option<u32>) {
        let (_, done) = self.pending.borrow_mut().remove(index);
        done(result);
    }
}

impl ShaderBuilder for ManualBuilder {
    type Program = u32;

    fn build(&self, request: ShaderRequest, done: Completion<u32>) {
        self.pending.borrow_mut().push((request, done));
    }
}

#[derive(Default)]
struct RecordingStatus {
    loader_visible: Cell<bool>,
    errors: RefCell<Vec<(String, String)>>,
    cleared: RefCell<Vec<String>>,
}

impl StatusDisplay for RecordingStatus {
    fn show_loader(&self, visible: bool) {
        self.loader_visible.set(visible);
    }

    fn set_error_message(&self, id: &str, message: &str) {
        self.errors
            .borrow_mut()
            .push((id.to_string(), message.to_string()));
    }

    fn clear_error_message(&self, id: &str) {
        self.cleared.borrow_mut().push(id.to_string());
    }
}

struct Harness {
    renderer: SceneRenderer<RecordingBackend>,
    log: Rc<RefCell<BackendLog>>,
    builder: Rc<ManualBuilder>,
    status: Rc<RecordingStatus>,
    params: Rc<ParameterStore>,
    canvas: Rc<CanvasEvents>,
}

fn harness_with(gem: Gemstone) -> Harness {
    let log = Rc::new(RefCell::new(BackendLog::default()));
    let builder = Rc::new(ManualBuilder::default());
    let status = Rc::new(RecordingStatus::default());
    let params = Rc::new(ParameterStore::default());
    let canvas = Rc::new(CanvasEvents::new(800, 600));
    let renderer = SceneRenderer::new(
        RecordingBackend { log: log.clone() },
        gem,
        RendererEnv {
            params: params.clone(),
            canvas: canvas.clone(),
            builder: builder.clone(),
            status: status.clone(),
        },
    );
    Harness {
        renderer,
        log,
        builder,
        status,
        params,
        canvas,
    }
}

fn harness() -> Harness {
    harness_with(Gemstone::brilliant(&Cut::default()))
}

fn last_frame(h: &Harness) -> Option<(u32, FrameUniforms)> {
    *h.log.borrow().frames.last().expect("no frame recorded")
}

#[test]
fn construction_allocates_cube_and_requests_first_build() {
    let h = harness();
    let log = h.log.borrow();
    assert_eq!(log.buffers, vec![("unit_cube".to_string(), 108, 3)]);
    assert_eq!(
        log.clear_colors,
        vec![Parameters::default().background_color.to_unit_rgba()]
    );
    assert_eq!(h.builder.pending_len(), 1);
    assert!(h.status.loader_visible.get());
    assert!(!h.renderer.has_program());
    assert_eq!(h.renderer.generation(), 1);
}

#[test]
fn request_carries_templates_fixed_state_and_facets() {
    let h = harness();
    let req = h.builder.request(0);
    assert_eq!(req.vertex_template, "gem.vert.wgsl");
    assert_eq!(req.fragment_template, "gem.frag.wgsl");
    assert_eq!(req.state, GEM_FIXED_STATE);
    assert_eq!(req.state.cull_face, Some(CullFace::Front));
    assert_eq!(req.state.front_face, Winding::Ccw);
    assert!(!req.state.depth_test);
    assert!(!req.state.blend);
    assert_eq!(req.vertex_components, 3);
    assert_eq!(req.injected["RAY_DEPTH"], "5");

    let vert = instantiate(template_source(req.vertex_template).unwrap(), &req.injected).unwrap();
    let frag = instantiate(template_source(req.fragment_template).unwrap(), &req.injected).unwrap();
    assert!(!vert.contains("#INJECT"));
    assert!(!frag.contains("#INJECT"));
    assert!(frag.contains("const FACET_24_NORMAL"));
}

#[test]
fn draw_before_first_build_clears_without_drawing() {
    let h = harness();
    h.renderer.draw().unwrap();
    assert_eq!(h.log.borrow().frames.len(), 1);
    assert!(last_frame(&h).is_none());
}

#[test]
fn successful_build_installs_program_and_draws_cube() {
    let h = harness();
    h.builder.resolve(0, Some(7));
    assert!(h.renderer.has_program());
    assert!(!h.status.loader_visible.get());
    assert_eq!(*h.status.cleared.borrow(), vec![SHADER_LOAD_FAIL_ID.to_string()]);

    h.renderer.draw().unwrap();
    let (program, uniforms) = last_frame(&h).expect("expected a draw");
    assert_eq!(program, 7);
    assert_eq!(uniforms.eye_position, h.renderer.camera().eye_position());
    assert_eq!(uniforms.mvp, h.renderer.view_projection());
    assert!((uniforms.refraction_index - 2.42).abs() < 1e-6);
    assert!(!uniforms.display_normals);
}

#[test]
fn failed_rebuild_after_success_releases_program_and_reports_once() {
    let h = harness();
    h.builder.resolve(0, Some(1));
    assert!(h.renderer.has_program());

    h.params.set_ray_depth(6);
    assert_eq!(h.builder.pending_len(), 1);
    assert_eq!(h.log.borrow().released, vec![1]);
    assert!(!h.renderer.has_program());

    h.builder.resolve(0, None);
    assert!(!h.renderer.has_program());
    assert!(!h.status.loader_visible.get());
    let errors = h.status.errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "shader_load_fail");
    assert_eq!(errors[0].1, "Failed to load/build the shader.");
    drop(errors);

    h.renderer.draw().unwrap();
    assert!(last_frame(&h).is_none());
}

#[test]
fn stale_completion_is_released_not_installed() {
    let h = harness();
    h.params.set_ray_depth(7);
    assert_eq!(h.builder.pending_len(), 2);
    assert_eq!(h.renderer.generation(), 2);

    // newest first, then the outdated one
    h.builder.resolve(1, Some(20));
    h.builder.resolve(0, Some(10));

    assert_eq!(h.log.borrow().released, vec![10]);
    h.renderer.draw().unwrap();
    assert_eq!(last_frame(&h).map(|(p, _)| p), Some(20));
}

#[test]
fn stale_failure_does_not_report_an_error() {
    let h = harness();
    h.params.set_ray_depth(3);
    h.builder.resolve(0, None);
    assert!(h.status.errors.borrow().is_empty());
    assert!(h.status.loader_visible.get());
    h.builder.resolve(0, Some(4));
    assert!(h.renderer.has_program());
}

#[test]
fn rebuild_uses_new_ray_depth_and_skips_unchanged_values() {
    let h = harness();
    h.params.set_ray_depth(5);
    assert_eq!(h.builder.pending_len(), 1);
    h.params.set_ray_depth(8);
    assert_eq!(h.builder.pending_len(), 2);
    assert_eq!(h.builder.request(1).injected["RAY_DEPTH"], "8");
}

#[test]
fn uniform_only_parameters_do_not_rebuild() {
    let h = harness();
    h.builder.resolve(0, Some(1));
    h.params.set_gem_color(Rgb::new(255, 0, 0));
    h.params.set_absorption(1.0);
    h.params.set_refraction_index(1.5);
    h.params.set_display_normals(true);
    assert_eq!(h.builder.pending_len(), 0);

    h.renderer.draw().unwrap();
    let (_, u) = last_frame(&h).unwrap();
    assert_eq!(u.absorption, glam::Vec3::new(0.0, 1.0, 1.0));
    assert!((u.refraction_index - 1.5).abs() < 1e-6);
    assert!(u.display_normals);
}

#[test]
fn background_change_updates_clear_colour() {
    let h = harness();
    h.params.set_background_color(Rgb::new(255, 0, 0));
    assert_eq!(
        h.log.borrow().clear_colors.last().copied(),
        Some([1.0, 0.0, 0.0, 1.0])
    );
}

#[test]
fn canvas_events_move_the_camera() {
    let h = harness();
    let before = h.renderer.camera();

    h.canvas.drag(DragDelta { dx: 0.1, dy: 0.0 });
    let after_drag = h.renderer.camera();
    assert!((after_drag.theta - (before.theta - DRAG_THETA_SPEED * 0.1)).abs() < 1e-5);

    h.canvas.wheel(3.0);
    assert!((h.renderer.camera().distance - (before.distance + 0.6)).abs() < 1e-5);

    let vp = h.renderer.view_projection();
    h.canvas.resize(400, 800);
    assert_ne!(vp, h.renderer.view_projection());
}

#[test]
fn dropping_renderer_unsubscribes_and_releases_program() {
    let h = harness();
    h.builder.resolve(0, Some(9));
    h.params.set_ray_depth(2);
    h.builder.resolve(0, Some(11));

    let Harness {
        renderer,
        log,
        builder,
        canvas,
        params,
        ..
    } = h;
    assert_eq!(canvas.mouse_drag.len(), 1);
    drop(renderer);

    assert!(canvas.mouse_drag.is_empty());
    assert!(canvas.mouse_wheel.is_empty());
    assert!(canvas.canvas_resize.is_empty());
    assert_eq!(log.borrow().released, vec![9, 11]);

    // no renderer left to rebuild
    params.set_ray_depth(4);
    assert_eq!(builder.pending_len(), 0);
}

#[test]
fn completion_after_drop_is_ignored() {
    let h = harness();
    let Harness {
        renderer, builder, ..
    } = h;
    drop(renderer);
    builder.resolve(0, Some(3));
}

#[test]
fn synchronous_builder_completes_inside_request() {
    struct ImmediateBuilder;
    impl ShaderBuilder for ImmediateBuilder {
        type Program = u32;
        fn build(&self, _request: ShaderRequest, done: Completion<u32>) {
            done(Some(42));
        }
    }

    let log = Rc::new(RefCell::new(BackendLog::default()));
    let params = Rc::new(ParameterStore::default());
    let renderer = SceneRenderer::new(
        RecordingBackend { log: log.clone() },
        Gemstone::brilliant(&Cut::default()),
        RendererEnv {
            params: params.clone(),
            canvas: Rc::new(CanvasEvents::new(1, 1)),
            builder: Rc::new(ImmediateBuilder),
            status: Rc::new(RecordingStatus::default()),
        },
    );
    assert!(renderer.has_program());
    params.set_ray_depth(9);
    assert!(renderer.has_program());
    assert_eq!(log.borrow().released, vec![42]);
}
