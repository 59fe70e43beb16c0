use crate::dom;
use gem_core::{action_for_key, wheel_notches, CanvasEvents, ParameterStore, PointerTracker};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!(format!("{:?}", e))
}

/// Pointer drags and wheel notches on the canvas feed the event hub.
pub fn wire_pointer(canvas: &web::HtmlCanvasElement, events: &Rc<CanvasEvents>) -> anyhow::Result<()> {
    let tracker = Rc::new(RefCell::new(PointerTracker::default()));

    // Pointer down: start tracking and keep receiving moves outside the canvas
    {
        let tracker = tracker.clone();
        let canvas_c = canvas.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            tracker
                .borrow_mut()
                .press(ev.client_x() as f32, ev.client_y() as f32);
            let _ = canvas_c.set_pointer_capture(ev.pointer_id());
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        closure.forget();
    }

    // Pointer move: CSS-pixel delta normalised by the canvas' CSS size
    {
        let tracker = tracker.clone();
        let events = events.clone();
        let canvas_c = canvas.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let w = canvas_c.client_width() as f32;
            let h = canvas_c.client_height() as f32;
            let delta = tracker
                .borrow_mut()
                .moved(ev.client_x() as f32, ev.client_y() as f32, w, h);
            if let Some(delta) = delta {
                events.drag(delta);
            }
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        closure.forget();
    }

    for name in ["pointerup", "pointercancel"] {
        let tracker = tracker.clone();
        let closure = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
            tracker.borrow_mut().release();
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        closure.forget();
    }

    {
        let events = events.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
            ev.prevent_default();
            let notches = wheel_notches(ev.delta_y());
            if notches != 0.0 {
                events.wheel(notches);
            }
        }) as Box<dyn FnMut(_)>);
        canvas
            .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        closure.forget();
    }
    Ok(())
}

/// Window resize: resync the backing size, then notify.
pub fn wire_resize(canvas: &web::HtmlCanvasElement, events: &Rc<CanvasEvents>) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let canvas_c = canvas.clone();
    let events = events.clone();
    let closure = Closure::wrap(Box::new(move || {
        let (w, h) = dom::sync_canvas_backing_size(&canvas_c);
        events.resize(w, h);
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        .map_err(js_err)?;
    closure.forget();
    Ok(())
}

pub fn wire_keyboard(params: &Rc<ParameterStore>) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let params = params.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
            return;
        }
        if let Some(action) = action_for_key(&ev.key()) {
            log::debug!("[keys] {} -> {:?}", ev.key(), action);
            params.apply(action);
            ev.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    window
        .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        .map_err(js_err)?;
    closure.forget();
    Ok(())
}
