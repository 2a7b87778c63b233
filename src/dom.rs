use portal_core::{PerspectiveCamera, SurfaceSize, Viewport};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

pub fn query_canvas(document: &web::Document, selector: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    document
        .query_selector(selector)
        .map_err(js_err)?
        .ok_or_else(|| anyhow::anyhow!("missing {}", selector))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("{} is not a canvas: {:?}", selector, e))
}

pub fn create<T: JsCast>(document: &web::Document, tag: &str) -> anyhow::Result<T> {
    document
        .create_element(tag)
        .map_err(js_err)?
        .dyn_into::<T>()
        .map_err(|e| anyhow::anyhow!("<{}> cast failed: {:?}", tag, e))
}

/// A DOM event listener that is removed from its target when dropped.
pub struct EventListener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    pub fn new(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        Self {
            target: target.clone(),
            event,
            closure,
        }
    }

    /// Registered with `passive: false` so the handler may cancel the
    /// default action (wheel scrolling, context menu).
    pub fn new_active(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let options = web::AddEventListenerOptions::new();
        options.set_passive(false);
        _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        );
        Self {
            target: target.clone(),
            event,
            closure,
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Window size in CSS pixels together with the device pixel ratio.
pub fn window_viewport(window: &web::Window) -> Viewport {
    let css = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0) as f32;
    Viewport::new(
        css(window.inner_width()),
        css(window.inner_height()),
        window.device_pixel_ratio() as f32,
    )
}

/// Match the canvas backing store to the window (pixel ratio capped), pin
/// its layout size to the window in CSS pixels and update the camera aspect
/// in the same step.
pub fn sync_canvas_backing_size(
    canvas: &web::HtmlCanvasElement,
    camera: &mut PerspectiveCamera,
) -> Option<SurfaceSize> {
    let window = web::window()?;
    let size = window_viewport(&window).apply(camera);
    canvas.set_width(size.width);
    canvas.set_height(size.height);
    let style = canvas.style();
    for (property, value) in [("width", size.css_width), ("height", size.css_height)] {
        if let Err(e) = style.set_property(property, &format!("{}px", value)) {
            log::warn!("[resize] canvas {}: {:?}", property, e);
        }
    }
    Some(size)
}
