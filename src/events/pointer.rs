use crate::dom::EventListener;
use crate::input::{self, DragMode, DragState};
use portal_core::{OrbitControls, PerspectiveCamera};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub controls: Rc<RefCell<OrbitControls>>,
    pub camera: Rc<RefCell<PerspectiveCamera>>,
    pub drag_state: Rc<RefCell<DragState>>,
}

/// Pointer and wheel handlers feeding the orbit controls. The returned
/// listeners stay registered for as long as they are held.
pub fn wire_input_handlers(w: InputWiring) -> Vec<EventListener> {
    vec![
        wire_pointerdown(&w),
        wire_pointermove(&w),
        wire_pointerup(&w, "pointerup"),
        wire_pointerup(&w, "pointercancel"),
        wire_wheel(&w),
        wire_contextmenu(&w),
    ]
}

fn canvas_pos(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> glam::Vec2 {
    let rect = canvas.get_bounding_client_rect();
    input::pointer_css_px(
        ev.client_x() as f32,
        ev.client_y() as f32,
        rect.left() as f32,
        rect.top() as f32,
    )
}

fn css_height(canvas: &web::HtmlCanvasElement) -> f32 {
    canvas.get_bounding_client_rect().height() as f32
}

fn wire_pointerdown(w: &InputWiring) -> EventListener {
    let w = w.clone();
    let target = w.canvas.clone();
    EventListener::new(target.as_ref(), "pointerdown", move |ev: web::Event| {
        let Ok(ev) = ev.dyn_into::<web::PointerEvent>() else {
            return;
        };
        let Some(mode) = input::drag_mode(ev.button(), ev.shift_key(), ev.ctrl_key() || ev.meta_key())
        else {
            return;
        };
        let pos = canvas_pos(&ev, &w.canvas);
        w.drag_state.borrow_mut().begin(mode, ev.pointer_id(), pos);
        _ = w.canvas.set_pointer_capture(ev.pointer_id());
        log::debug!("[pointer] begin {:?}", mode);
        ev.prevent_default();
    })
}

fn wire_pointermove(w: &InputWiring) -> EventListener {
    let w = w.clone();
    let target = w.canvas.clone();
    EventListener::new(target.as_ref(), "pointermove", move |ev: web::Event| {
        let Ok(ev) = ev.dyn_into::<web::PointerEvent>() else {
            return;
        };
        let pos = canvas_pos(&ev, &w.canvas);
        let Some((mode, delta)) = w.drag_state.borrow_mut().step(ev.pointer_id(), pos) else {
            return;
        };
        let height = css_height(&w.canvas);
        let mut controls = w.controls.borrow_mut();
        match mode {
            DragMode::Rotate => controls.rotate_by_pixels(delta.x, delta.y, height),
            DragMode::Pan => controls.pan_by_pixels(delta.x, delta.y, height, &w.camera.borrow()),
            // one zoom step per move event, direction from the vertical travel
            DragMode::Dolly => controls.zoom_by_wheel(delta.y),
        }
    })
}

fn wire_pointerup(w: &InputWiring, event: &'static str) -> EventListener {
    let w = w.clone();
    let target = w.canvas.clone();
    EventListener::new(target.as_ref(), event, move |ev: web::Event| {
        let Ok(ev) = ev.dyn_into::<web::PointerEvent>() else {
            return;
        };
        if w.drag_state.borrow_mut().end(ev.pointer_id()) {
            _ = w.canvas.release_pointer_capture(ev.pointer_id());
        }
    })
}

fn wire_wheel(w: &InputWiring) -> EventListener {
    let w = w.clone();
    let target = w.canvas.clone();
    EventListener::new_active(target.as_ref(), "wheel", move |ev: web::Event| {
        let Ok(ev) = ev.dyn_into::<web::WheelEvent>() else {
            return;
        };
        w.controls.borrow_mut().zoom_by_wheel(ev.delta_y() as f32);
        ev.prevent_default();
    })
}

fn wire_contextmenu(w: &InputWiring) -> EventListener {
    let target = w.canvas.clone();
    // secondary button pans; keep the browser menu out of the way
    EventListener::new_active(target.as_ref(), "contextmenu", |ev: web::Event| {
        ev.prevent_default();
    })
}
