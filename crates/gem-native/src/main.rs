use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::Key,
    window::{Window, WindowBuilder},
};

use gem_core::{
    action_for_key, wheel_notches, CanvasEvents, Cut, Gemstone, ParameterStore, Parameters,
    PointerTracker, RendererEnv, SceneRenderer, StatusDisplay,
};
use gem_gpu::{GpuContext, LocalFuture, Spawner, WgpuBackend};

const WINDOW_TITLE: &str = "Gem Viewer (native)";

/// Status surface for the desktop: log lines plus a window title suffix.
struct NativeStatus {
    window: Arc<Window>,
    loading: Cell<bool>,
    error: RefCell<Option<String>>,
}

impl NativeStatus {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            loading: Cell::new(false),
            error: RefCell::new(None),
        }
    }

    fn refresh_title(&self) {
        let title = match (self.error.borrow().as_deref(), self.loading.get()) {
            (Some(msg), _) => format!("{} - {}", WINDOW_TITLE, msg),
            (None, true) => format!("{} - building shader...", WINDOW_TITLE),
            (None, false) => WINDOW_TITLE.to_string(),
        };
        self.window.set_title(&title);
    }
}

impl StatusDisplay for NativeStatus {
    fn show_loader(&self, visible: bool) {
        if self.loading.replace(visible) != visible {
            self.refresh_title();
        }
    }

    fn set_error_message(&self, id: &str, message: &str) {
        log::error!("[status] {}: {}", id, message);
        *self.error.borrow_mut() = Some(message.to_string());
        self.refresh_title();
    }

    fn clear_error_message(&self, _id: &str) {
        if self.error.borrow_mut().take().is_some() {
            self.refresh_title();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    // Optional `depth=6&ior=2.1&...` overrides as the first argument
    let mut values = Parameters::default();
    if let Some(query) = std::env::args().nth(1) {
        for e in values.apply_query(&query) {
            log::warn!("[config] {}", e);
        }
    }

    let event_loop = EventLoop::new()?;
    let window = Arc::new(WindowBuilder::new().with_title(WINDOW_TITLE).build(&event_loop)?);
    let size = window.inner_size();

    let params = Rc::new(ParameterStore::new(values));
    let canvas = Rc::new(CanvasEvents::new(size.width, size.height));
    let status = Rc::new(NativeStatus::new(window.clone()));

    let ctx = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))?;
    let backend = WgpuBackend::new(ctx);
    let spawner: Spawner = Rc::new(|build: LocalFuture| pollster::block_on(build));
    let builder = Rc::new(backend.shader_builder(spawner));

    let renderer = SceneRenderer::new(
        backend,
        Gemstone::brilliant(&Cut::default()),
        RendererEnv {
            params: params.clone(),
            canvas: canvas.clone(),
            builder,
            status,
        },
    );
    let mut pointer = PointerTracker::default();
    let mut cursor = (0.0f32, 0.0f32);

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                renderer.with_backend(|b| b.resize(size.width, size.height));
                canvas.resize(size.width, size.height);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => pointer.press(cursor.0, cursor.1),
                ElementState::Released => pointer.release(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                cursor = (position.x as f32, position.y as f32);
                let (w, h) = canvas.size();
                if let Some(delta) = pointer.moved(cursor.0, cursor.1, w as f32, h as f32) {
                    canvas.drag(delta);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive; browsers the opposite
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(p) => p.y,
                };
                let notches = -wheel_notches(dy);
                if notches != 0.0 {
                    canvas.wheel(notches);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Character(ref text),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(action) = action_for_key(text.as_str()) {
                    log::debug!("[keys] {} -> {:?}", text, action);
                    params.apply(action);
                }
            }
            _ => {}
        },
        Event::AboutToWait => match renderer.draw() {
            Ok(()) => window.request_redraw(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.with_backend(|b| b.reconfigure())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("[frame] out of GPU memory");
                elwt.exit();
            }
            Err(e) => log::warn!("[frame] {:?}", e),
        },
        _ => {}
    })?;
    Ok(())
}
