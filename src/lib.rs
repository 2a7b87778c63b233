#![cfg(target_arch = "wasm32")]
use instant::Instant;
use portal_core::{
    load_model, load_texture, FrameStats, LoopControl, OrbitControls, ParamStore, PerspectiveCamera,
    PortalScene, RenderLoop, SceneConfig, SceneParams, Subscription, TextureOptions, TextureSlot,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod fetch;
mod frame;
mod input;
mod overlay;
mod panel;
mod render;

use constants::CANVAS_SELECTOR;
use dom::EventListener;
use fetch::FetchSource;
use render::PendingTextures;

/// Everything `shutdown` tears down.
struct App {
    control: LoopControl,
    panel: Rc<RefCell<Option<panel::Panel>>>,
    _subscription: Subscription,
    _listeners: Vec<EventListener>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn wire_canvas_resize(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    camera: Rc<RefCell<PerspectiveCamera>>,
) -> EventListener {
    dom::sync_canvas_backing_size(canvas, &mut camera.borrow_mut());
    let canvas_resize = canvas.clone();
    EventListener::new(window.as_ref(), "resize", move |_| {
        if let Some(size) = dom::sync_canvas_backing_size(&canvas_resize, &mut camera.borrow_mut()) {
            log::debug!("[resize] {}x{} @{}", size.width, size.height, size.pixel_ratio);
        }
    })
}

fn spawn_model_load(
    path: String,
    scene: Rc<RefCell<PortalScene>>,
    store: Rc<RefCell<ParamStore>>,
    document: web::Document,
) {
    spawn_local(async move {
        let model = match load_model(&FetchSource, &path).await {
            Ok(m) => m,
            Err(e) => {
                log::error!("[assets] {}", e);
                overlay::show_error(&document, &e.to_string());
                return;
            }
        };
        let params = store.borrow().params().clone();
        match scene.borrow_mut().bind_model(&model, &params) {
            Ok(bound) => log::info!(
                "[assets] model bound: {} meshes, {} portal points",
                bound.meshes.len(),
                bound.portal_points
            ),
            Err(e) => {
                log::error!("[bind] {}", e);
                overlay::show_error(&document, &e.to_string());
            }
        }
    });
}

fn spawn_texture_load(
    slot: TextureSlot,
    path: String,
    pending: Rc<RefCell<PendingTextures>>,
    document: web::Document,
) {
    spawn_local(async move {
        match load_texture(&FetchSource, &path, TextureOptions::BAKED).await {
            Ok(image) => pending.borrow_mut().push(slot, image),
            Err(e) => {
                log::error!("[assets] {}", e);
                overlay::show_error(&document, &e.to_string());
            }
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("portal-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
            if let Some(document) = dom::window_document() {
                overlay::show_error(&document, &format!("{}", e));
            }
        }
    });
    Ok(())
}

/// Stop the render loop and drop every listener, subscription and the panel.
#[wasm_bindgen]
pub fn shutdown() {
    let Some(app) = APP.with(|a| a.borrow_mut().take()) else {
        return;
    };
    app.control.stop();
    app.panel.borrow_mut().take();
    if let Some(document) = dom::window_document() {
        overlay::hide_error(&document);
    }
    drop(app);
    log::info!("portal-web shut down");
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::query_canvas(&document, CANVAS_SELECTOR)?;

    let config = SceneConfig {
        device_pixel_ratio: window.device_pixel_ratio() as f32,
        ..SceneConfig::default()
    };

    // Parameters and the scene they drive
    let store = Rc::new(RefCell::new(ParamStore::new(SceneParams::default())));
    let scene = Rc::new(RefCell::new(PortalScene::new(&config, store.borrow().params())));
    let subscription = {
        let scene = scene.clone();
        store
            .borrow()
            .subscribe(move |change, params| scene.borrow_mut().apply(change, params))
    };

    // Camera, controls and input
    let camera = Rc::new(RefCell::new(PerspectiveCamera::new(&config.camera, 1.0)));
    let controls = Rc::new(RefCell::new(OrbitControls::new(
        config.controls.clone(),
        config.camera.target,
    )));
    let mut listeners = vec![wire_canvas_resize(&window, &canvas, camera.clone())];
    listeners.extend(events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        controls: controls.clone(),
        camera: camera.clone(),
        drag_state: Rc::new(RefCell::new(input::DragState::default())),
    }));

    let panel = match panel::Panel::build(&document, store.clone()) {
        Ok(p) => Some(p),
        Err(e) => {
            log::error!("[panel] {:?}", e);
            None
        }
    };
    let panel = Rc::new(RefCell::new(panel));

    // Assets load concurrently; the scene renders with placeholders meanwhile
    let textures = Rc::new(RefCell::new(PendingTextures::default()));
    spawn_model_load(
        config.assets.model.clone(),
        scene.clone(),
        store.clone(),
        document.clone(),
    );
    spawn_texture_load(
        TextureSlot::Baked,
        config.assets.baked_texture.clone(),
        textures.clone(),
        document.clone(),
    );
    spawn_texture_load(
        TextureSlot::LightMap,
        config.assets.light_map_texture.clone(),
        textures.clone(),
        document.clone(),
    );

    let control = LoopControl::new();
    APP.with(|a| {
        *a.borrow_mut() = Some(App {
            control: control.clone(),
            panel: panel.clone(),
            _subscription: subscription,
            _listeners: listeners,
        })
    });

    let gpu = frame::init_gpu(&canvas, config.capped_pixel_ratio()).await;
    if gpu.is_none() {
        overlay::show_error(&document, "WebGPU is not available in this browser");
    }

    let frame_ctx = frame::FrameContext {
        scene,
        camera,
        controls,
        render_loop: RenderLoop::new(control),
        stats: FrameStats::default(),
        panel,
        canvas,
        gpu,
        textures,
        started: Instant::now(),
    };
    frame::start_loop(frame_ctx);
    Ok(())
}
