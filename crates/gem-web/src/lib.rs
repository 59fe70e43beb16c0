//! Browser entry point. Expects a page with a `<canvas id="gem-canvas">`, a
//! loader element `#gem-loader` and an (initially empty) `#gem-errors` list.

#![cfg(target_arch = "wasm32")]
use gem_core::{
    CanvasEvents, Cut, Gemstone, ParameterStore, Parameters, RendererEnv, SceneRenderer,
};
use gem_gpu::{GpuContext, LocalFuture, Spawner, WgpuBackend};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod dom;
mod events;
mod frame;
mod status;

pub const CANVAS_ID: &str = "gem-canvas";
pub const LOADER_ID: &str = "gem-loader";
pub const ERRORS_ID: &str = "gem-errors";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("gem-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::canvas_by_id(&document, CANVAS_ID)?;
    let (width, height) = dom::sync_canvas_backing_size(&canvas);

    let mut values = Parameters::default();
    for e in values.apply_query(&dom::query_string()) {
        log::warn!("[config] {}", e);
    }
    let params = Rc::new(ParameterStore::new(values));
    let canvas_events = Rc::new(CanvasEvents::new(width, height));
    let status = Rc::new(status::DomStatus::new(document, LOADER_ID, ERRORS_ID));

    let ctx = GpuContext::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), width, height).await?;
    let backend = WgpuBackend::new(ctx);
    let spawner: Spawner = Rc::new(|build: LocalFuture| spawn_local(build));
    let builder = Rc::new(backend.shader_builder(spawner));

    let renderer = Rc::new(SceneRenderer::new(
        backend,
        Gemstone::brilliant(&Cut::default()),
        RendererEnv {
            params: params.clone(),
            canvas: canvas_events.clone(),
            builder,
            status,
        },
    ));

    events::wire_pointer(&canvas, &canvas_events)?;
    events::wire_resize(&canvas, &canvas_events)?;
    events::wire_keyboard(&params)?;
    frame::wire_surface_resize(&renderer, &canvas_events);
    frame::start_loop(renderer);
    Ok(())
}
