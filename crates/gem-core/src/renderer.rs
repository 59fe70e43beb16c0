//! Scene renderer: owns the bounding cube, the orbit camera and the
//! facet-specific shading program, and issues one draw per frame.
//!
//! The renderer never talks to a GPU API directly. A [`RenderBackend`]
//! allocates buffers and records frames, a [`ShaderBuilder`] compiles
//! instantiated templates asynchronously, and a [`StatusDisplay`] shows the
//! loader and error messages. All three are swapped for recording doubles in
//! host tests.
//!
//! Program lifecycle: a rebuild releases the active program immediately and
//! tags the request with a fresh generation. Only the completion carrying the
//! latest generation may install its result; older completions are released
//! and dropped, so overlapping rebuilds cannot race.

use crate::camera::{CameraLimits, OrbitControls, OrbitalCamera};
use crate::canvas::{CanvasEvents, DragDelta};
use crate::constants::*;
use crate::gemstone::Gemstone;
use crate::observer::Subscription;
use crate::params::ParameterSource;
use crate::shader_gen::{self, Injected};
use glam::{Mat4, Vec3};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// 6 faces × 2 triangles of the unit cube centred on the origin.
#[rustfmt::skip]
pub static UNIT_CUBE: [f32; 108] = [
    -0.5, -0.5, -0.5,   0.5, -0.5, -0.5,  -0.5, -0.5,  0.5,
     0.5, -0.5, -0.5,   0.5, -0.5,  0.5,  -0.5, -0.5,  0.5,

     0.5, -0.5, -0.5,   0.5,  0.5, -0.5,   0.5, -0.5,  0.5,
     0.5,  0.5, -0.5,   0.5,  0.5,  0.5,   0.5, -0.5,  0.5,

    -0.5, -0.5,  0.5,   0.5, -0.5,  0.5,  -0.5,  0.5,  0.5,
     0.5, -0.5,  0.5,   0.5,  0.5,  0.5,  -0.5,  0.5,  0.5,

    -0.5,  0.5, -0.5,  -0.5,  0.5,  0.5,   0.5,  0.5, -0.5,
     0.5,  0.5, -0.5,  -0.5,  0.5,  0.5,   0.5,  0.5,  0.5,

    -0.5, -0.5, -0.5,  -0.5, -0.5,  0.5,  -0.5,  0.5, -0.5,
    -0.5,  0.5, -0.5,  -0.5, -0.5,  0.5,  -0.5,  0.5,  0.5,

    -0.5, -0.5, -0.5,  -0.5,  0.5, -0.5,   0.5, -0.5, -0.5,
     0.5, -0.5, -0.5,  -0.5,  0.5, -0.5,   0.5,  0.5, -0.5,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winding {
    Cw,
    Ccw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullFace {
    Front,
    Back,
}

/// Rasteriser state that stays fixed for the lifetime of the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedState {
    pub front_face: Winding,
    pub cull_face: Option<CullFace>,
    pub depth_test: bool,
    pub blend: bool,
}

/// Front faces are culled so exactly one back face of the cube covers each
/// pixel of the gem's silhouette.
pub const GEM_FIXED_STATE: FixedState = FixedState {
    front_face: Winding::Ccw,
    cull_face: Some(CullFace::Front),
    depth_test: false,
    blend: false,
};

/// Everything a build service needs to produce a program.
#[derive(Clone, Debug)]
pub struct ShaderRequest {
    pub vertex_template: &'static str,
    pub fragment_template: &'static str,
    pub injected: Injected,
    pub state: FixedState,
    pub vertex_components: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub mvp: Mat4,
    pub eye_position: Vec3,
    pub absorption: Vec3,
    pub display_normals: bool,
    pub refraction_index: f32,
}

pub struct DrawCall<'a, Buf, Prog> {
    pub program: &'a Prog,
    pub buffer: &'a Buf,
    pub uniforms: FrameUniforms,
    pub vertex_count: u32,
}

pub trait RenderBackend {
    type Buffer: 'static;
    type Program: 'static;
    type Error;

    fn create_vertex_buffer(&mut self, label: &str, vertices: &[f32], components: u32)
        -> Self::Buffer;
    fn set_clear_color(&mut self, rgba: [f32; 4]);
    /// Clear the frame and, when `draw` is present, issue it.
    fn render(
        &mut self,
        draw: Option<DrawCall<'_, Self::Buffer, Self::Program>>,
    ) -> Result<(), Self::Error>;
    fn release_program(&mut self, program: Self::Program);
}

pub type Completion<P> = Box<dyn FnOnce(Option<P>)>;

/// Asynchronous program compilation; `done` receives `None` on failure.
pub trait ShaderBuilder {
    type Program;

    fn build(&self, request: ShaderRequest, done: Completion<Self::Program>);
}

pub trait StatusDisplay {
    fn show_loader(&self, visible: bool);
    fn set_error_message(&self, id: &str, message: &str);
    fn clear_error_message(&self, id: &str);
}

/// Collaborators the renderer subscribes to and reads from.
pub struct RendererEnv<P> {
    pub params: Rc<dyn ParameterSource>,
    pub canvas: Rc<CanvasEvents>,
    pub builder: Rc<dyn ShaderBuilder<Program = P>>,
    pub status: Rc<dyn StatusDisplay>,
}

impl<P> Clone for RendererEnv<P> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            canvas: self.canvas.clone(),
            builder: self.builder.clone(),
            status: self.status.clone(),
        }
    }
}

struct RendererState<B: RenderBackend> {
    backend: B,
    cube: B::Buffer,
    controls: OrbitControls,
    program: Option<B::Program>,
    generation: u64,
    gemstone: Gemstone,
    params: Rc<dyn ParameterSource>,
    status: Rc<dyn StatusDisplay>,
}

impl<B: RenderBackend> RendererState<B> {
    /// Release whatever is active, then take `program`.
    fn install(&mut self, program: Option<B::Program>) {
        if let Some(old) = self.program.take() {
            self.backend.release_program(old);
        }
        self.program = program;
    }

    fn begin_rebuild(&mut self) -> (u64, ShaderRequest) {
        self.generation += 1;
        self.install(None);
        self.status.show_loader(true);
        let ray_depth = self.params.current().ray_depth;
        log::info!(
            "[shader] build #{} facets={} ray_depth={}",
            self.generation,
            self.gemstone.facets.len(),
            ray_depth
        );
        let request = ShaderRequest {
            vertex_template: shader_gen::VERTEX_TEMPLATE,
            fragment_template: shader_gen::FRAGMENT_TEMPLATE,
            injected: shader_gen::generate(&self.gemstone.facets, ray_depth),
            state: GEM_FIXED_STATE,
            vertex_components: CUBE_COMPONENTS,
        };
        (self.generation, request)
    }

    fn complete(&mut self, generation: u64, result: Option<B::Program>) {
        if generation != self.generation {
            log::debug!(
                "[shader] discarding stale build #{} (latest #{})",
                generation,
                self.generation
            );
            if let Some(program) = result {
                self.backend.release_program(program);
            }
            return;
        }
        self.status.show_loader(false);
        let built = result.is_some();
        self.install(result);
        if built {
            log::info!("[shader] build #{} ready", generation);
            self.status.clear_error_message(SHADER_LOAD_FAIL_ID);
        } else {
            log::error!("[shader] build #{} failed", generation);
            self.status
                .set_error_message(SHADER_LOAD_FAIL_ID, SHADER_LOAD_FAIL_MESSAGE);
        }
    }
}

pub struct SceneRenderer<B: RenderBackend> {
    state: Rc<RefCell<RendererState<B>>>,
    subscriptions: Vec<Subscription>,
}

impl<B: RenderBackend + 'static> SceneRenderer<B> {
    pub fn new(mut backend: B, gemstone: Gemstone, env: RendererEnv<B::Program>) -> Self {
        env.status.show_loader(true);

        let cube = backend.create_vertex_buffer("unit_cube", &UNIT_CUBE, CUBE_COMPONENTS);
        backend.set_clear_color(env.params.current().background_color.to_unit_rgba());
        let controls = OrbitControls::new(
            OrbitalCamera::default(),
            CameraLimits::default(),
            env.canvas.aspect_ratio(),
        );

        let state = Rc::new(RefCell::new(RendererState {
            backend,
            cube,
            controls,
            program: None,
            generation: 0,
            gemstone,
            params: env.params.clone(),
            status: env.status.clone(),
        }));
        let subscriptions = subscribe(&state, &env);

        request_program(&Rc::downgrade(&state), env.builder.as_ref());

        Self {
            state,
            subscriptions,
        }
    }

    /// Clear, then draw the gem if a program is installed.
    pub fn draw(&self) -> Result<(), B::Error> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let Some(program) = st.program.as_ref() else {
            return st.backend.render(None);
        };
        st.status.show_loader(false);

        let params = st.params.current();
        let uniforms = FrameUniforms {
            mvp: st.controls.view_projection(),
            eye_position: st.controls.eye_position(),
            absorption: params.absorption_vector(),
            display_normals: params.display_normals,
            refraction_index: params.refraction_index,
        };
        st.backend.render(Some(DrawCall {
            program,
            buffer: &st.cube,
            uniforms,
            vertex_count: CUBE_VERTEX_COUNT,
        }))
    }

    pub fn has_program(&self) -> bool {
        self.state.borrow().program.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    pub fn camera(&self) -> OrbitalCamera {
        self.state.borrow().controls.camera().clone()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.state.borrow().controls.view_projection()
    }

    /// Run `f` against the backend, e.g. to reconfigure a resized surface.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut self.state.borrow_mut().backend)
    }
}

impl<B: RenderBackend> Drop for SceneRenderer<B> {
    fn drop(&mut self) {
        self.subscriptions.clear();
        if let Ok(mut st) = self.state.try_borrow_mut() {
            st.install(None);
        }
    }
}

fn subscribe<B: RenderBackend + 'static>(
    state: &Rc<RefCell<RendererState<B>>>,
    env: &RendererEnv<B::Program>,
) -> Vec<Subscription> {
    let weak = Rc::downgrade(state);
    let mut subs = Vec::with_capacity(5);

    let w = weak.clone();
    subs.push(env.canvas.mouse_drag.subscribe(move |d: &DragDelta| {
        if let Some(s) = w.upgrade() {
            s.borrow_mut().controls.drag(d.dx, d.dy);
        }
    }));

    let w = weak.clone();
    subs.push(env.canvas.mouse_wheel.subscribe(move |delta: &f32| {
        if let Some(s) = w.upgrade() {
            s.borrow_mut().controls.wheel(*delta);
        }
    }));

    // weak canvas: the canvas owns this callback
    let w = weak.clone();
    let canvas = Rc::downgrade(&env.canvas);
    subs.push(env.canvas.canvas_resize.subscribe(move |_| {
        if let (Some(s), Some(c)) = (w.upgrade(), canvas.upgrade()) {
            s.borrow_mut().controls.set_aspect(c.aspect_ratio());
        }
    }));

    let w = weak.clone();
    subs.push(env.params.on_background_color(Box::new(move |color| {
        if let Some(s) = w.upgrade() {
            s.borrow_mut().backend.set_clear_color(color.to_unit_rgba());
        }
    })));

    let builder = env.builder.clone();
    subs.push(env.params.on_recompute_shader(Box::new(move || {
        request_program(&weak, builder.as_ref());
    })));

    subs
}

/// Start a build for the current facets and ray depth. The state borrow is
/// released before the builder runs, so a synchronous completion is fine.
fn request_program<B: RenderBackend + 'static>(
    state: &Weak<RefCell<RendererState<B>>>,
    builder: &dyn ShaderBuilder<Program = B::Program>,
) {
    let Some(shared) = state.upgrade() else {
        return;
    };
    let (generation, request) = shared.borrow_mut().begin_rebuild();
    let weak = state.clone();
    builder.build(
        request,
        Box::new(move |result| match weak.upgrade() {
            Some(s) => s.borrow_mut().complete(generation, result),
            None => log::debug!("[shader] renderer gone, dropping build #{}", generation),
        }),
    );
}
