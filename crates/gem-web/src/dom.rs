use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", id))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("#{} is not a canvas: {:?}", id, e)))
}

/// Match the canvas backing store to its CSS size × devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let rect = canvas.get_bounding_client_rect();
    let w_px = ((rect.width() * dpr) as u32).max(1);
    let h_px = ((rect.height() * dpr) as u32).max(1);
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    (w_px, h_px)
}

/// `window.location.search`, or empty when unavailable.
pub fn query_string() -> String {
    web::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}
