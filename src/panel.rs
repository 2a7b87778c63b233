//! Floating parameter panel: an fps graph and one collapsible folder per
//! `Folder`, with a slider or color picker for every `ParamSpec`.
//!
//! The panel writes through `ParamStore::set`; it never reads scene state.
//! All listeners are owned by the panel and go away with it.

use crate::constants::*;
use crate::dom::{self, EventListener};
use portal_core::{param_specs, Color, Folder, FrameStats, ParamKind, ParamSpec, ParamStore, ParamValue};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

const FOLDERS: [Folder; 3] = [Folder::General, Folder::Portal, Folder::Pole];

pub struct Panel {
    root: web::HtmlElement,
    fps_label: web::HtmlElement,
    fps_ctx: Option<web::CanvasRenderingContext2d>,
    _listeners: Vec<EventListener>,
}

impl Panel {
    pub fn build(document: &web::Document, store: Rc<RefCell<ParamStore>>) -> anyhow::Result<Self> {
        let root: web::HtmlElement = dom::create(document, "div")?;
        root.set_id(PANEL_ID);
        _ = root.set_attribute(
            "style",
            &format!(
                "position:fixed;top:8px;right:8px;width:{}px;padding:8px;\
                 font:11px system-ui;color:#eee;background:rgba(20,20,28,0.9);\
                 border-radius:4px;z-index:5;user-select:none",
                PANEL_WIDTH_PX
            ),
        );

        let fps_label: web::HtmlElement = dom::create(document, "div")?;
        fps_label.set_text_content(Some("-- fps"));
        root.append_child(&fps_label).map_err(dom::js_err)?;

        let fps_canvas: web::HtmlCanvasElement = dom::create(document, "canvas")?;
        fps_canvas.set_width(FPS_GRAPH_WIDTH_PX);
        fps_canvas.set_height(FPS_GRAPH_HEIGHT_PX);
        _ = fps_canvas.set_attribute("style", "display:block;margin:4px 0 6px");
        root.append_child(&fps_canvas).map_err(dom::js_err)?;
        let fps_ctx = fps_canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<web::CanvasRenderingContext2d>().ok());

        let mut listeners = Vec::new();
        for folder in FOLDERS {
            let details = dom::create::<web::Element>(document, "details")?;
            _ = details.set_attribute("open", "");
            let summary = dom::create::<web::Element>(document, "summary")?;
            summary.set_text_content(Some(folder.title()));
            details.append_child(&summary).map_err(dom::js_err)?;

            for spec in param_specs().iter().filter(|s| s.folder == folder) {
                let (row, listener) = build_row(document, spec, &store)?;
                details.append_child(&row).map_err(dom::js_err)?;
                listeners.push(listener);
            }
            root.append_child(&details).map_err(dom::js_err)?;
        }

        document
            .body()
            .ok_or_else(|| anyhow::anyhow!("no body"))?
            .append_child(&root)
            .map_err(dom::js_err)?;
        log::info!("[panel] built with {} controls", listeners.len());

        Ok(Self {
            root,
            fps_label,
            fps_ctx,
            _listeners: listeners,
        })
    }

    /// Redraw the fps readout and history bars.
    pub fn draw_stats(&self, stats: &FrameStats) {
        self.fps_label.set_text_content(Some(&format!(
            "{:.0} fps ({:.1} ms)",
            stats.fps(),
            stats.last_frame_ms()
        )));
        let Some(ctx) = &self.fps_ctx else {
            return;
        };
        let w = FPS_GRAPH_WIDTH_PX as f64;
        let h = FPS_GRAPH_HEIGHT_PX as f64;
        ctx.set_fill_style_str("#101018");
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str("#04bcbd");
        let n = stats.history_len().max(1) as f64;
        let bar = w / n;
        for (i, fps) in stats.history().enumerate() {
            let v = (fps / FPS_GRAPH_CEILING).clamp(0.0, 1.0) as f64 * h;
            ctx.fill_rect(i as f64 * bar, h - v, bar.max(1.0), v);
        }
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.root.remove();
    }
}

fn build_row(
    document: &web::Document,
    spec: &'static ParamSpec,
    store: &Rc<RefCell<ParamStore>>,
) -> anyhow::Result<(web::Element, EventListener)> {
    let row = dom::create::<web::Element>(document, "label")?;
    _ = row.set_attribute(
        "style",
        "display:flex;align-items:center;gap:6px;margin:3px 0",
    );
    let name = dom::create::<web::Element>(document, "span")?;
    name.set_text_content(Some(spec.label));
    _ = name.set_attribute("style", "flex:0 0 96px;overflow:hidden");
    row.append_child(&name).map_err(dom::js_err)?;

    let input: web::HtmlInputElement = dom::create(document, "input")?;
    let current = store.borrow().params().get(spec.key);
    let listener = match spec.kind {
        ParamKind::Slider { min, max, step } => {
            input.set_type("range");
            input.set_min(&min.to_string());
            input.set_max(&max.to_string());
            input.set_step(&step.to_string());
            input.set_value(&current.as_scalar().unwrap_or(min).to_string());
            _ = input.set_attribute("style", "flex:1");
            let readout = dom::create::<web::Element>(document, "span")?;
            readout.set_text_content(Some(&format_scalar(current.as_scalar().unwrap_or(min))));
            _ = readout.set_attribute("style", "flex:0 0 44px;text-align:right");

            let store = store.clone();
            let input_ev = input.clone();
            let readout_ev = readout.clone();
            let listener = EventListener::new(input.as_ref(), "input", move |_| {
                let v = input_ev.value_as_number() as f32;
                match store.borrow_mut().set(spec.key, ParamValue::Scalar(v)) {
                    Ok(change) => {
                        let shown = change.value.as_scalar().unwrap_or(v);
                        readout_ev.set_text_content(Some(&format_scalar(shown)));
                    }
                    Err(e) => log::warn!("[panel] {}", e),
                }
            });
            row.append_child(&input).map_err(dom::js_err)?;
            row.append_child(&readout).map_err(dom::js_err)?;
            listener
        }
        ParamKind::Color => {
            input.set_type("color");
            input.set_value(&current.as_color().unwrap_or_default().to_hex());
            let store = store.clone();
            let input_ev = input.clone();
            let listener = EventListener::new(input.as_ref(), "input", move |_| {
                let color = match input_ev.value().parse::<Color>() {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("[panel] {}", e);
                        return;
                    }
                };
                if let Err(e) = store.borrow_mut().set(spec.key, ParamValue::Color(color)) {
                    log::warn!("[panel] {}", e);
                }
            });
            row.append_child(&input).map_err(dom::js_err)?;
            listener
        }
    };
    Ok((row, listener))
}

fn format_scalar(v: f32) -> String {
    format!("{:.4}", v)
}
