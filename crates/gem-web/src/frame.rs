use gem_core::{CanvasEvents, SceneRenderer};
use gem_gpu::WgpuBackend;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type WebRenderer = SceneRenderer<WgpuBackend>;

/// Reconfigure the surface whenever the canvas backing size changes.
pub fn wire_surface_resize(renderer: &Rc<WebRenderer>, events: &Rc<CanvasEvents>) {
    let renderer = Rc::downgrade(renderer);
    let events_w = Rc::downgrade(events);
    events
        .canvas_resize
        .subscribe(move |_| {
            if let (Some(r), Some(e)) = (renderer.upgrade(), events_w.upgrade()) {
                let (w, h) = e.size();
                r.with_backend(|b| b.resize(w, h));
            }
        })
        .detach();
}

fn draw_frame(renderer: &WebRenderer) -> bool {
    match renderer.draw() {
        Ok(()) => true,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            renderer.with_backend(|b| b.reconfigure());
            true
        }
        Err(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("[frame] out of GPU memory; stopping the render loop");
            false
        }
        Err(e) => {
            log::warn!("[frame] {:?}", e);
            true
        }
    }
}

pub fn start_loop(renderer: Rc<WebRenderer>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !draw_frame(&renderer) {
            return;
        }
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
