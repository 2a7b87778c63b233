use crate::constants::{BUTTON_MIDDLE, BUTTON_PRIMARY, BUTTON_SECONDARY};
use glam::Vec2;

/// What a pointer drag does to the orbit controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Dolly,
    Pan,
}

/// Primary drags rotate (pan with a modifier), middle dollies, secondary pans.
#[inline]
pub fn drag_mode(button: i16, shift: bool, ctrl_or_meta: bool) -> Option<DragMode> {
    match button {
        BUTTON_PRIMARY if shift || ctrl_or_meta => Some(DragMode::Pan),
        BUTTON_PRIMARY => Some(DragMode::Rotate),
        BUTTON_MIDDLE => Some(DragMode::Dolly),
        BUTTON_SECONDARY => Some(DragMode::Pan),
        _ => None,
    }
}

/// Tracks one active drag in CSS pixels.
#[derive(Default, Clone, Copy, Debug)]
pub struct DragState {
    pub mode: Option<DragMode>,
    pub pointer_id: i32,
    pub last: Vec2,
}

impl DragState {
    pub fn begin(&mut self, mode: DragMode, pointer_id: i32, pos: Vec2) {
        self.mode = Some(mode);
        self.pointer_id = pointer_id;
        self.last = pos;
    }

    /// Movement since the previous event of the same pointer.
    pub fn step(&mut self, pointer_id: i32, pos: Vec2) -> Option<(DragMode, Vec2)> {
        let mode = self.mode?;
        if pointer_id != self.pointer_id {
            return None;
        }
        let delta = pos - self.last;
        self.last = pos;
        Some((mode, delta))
    }

    /// Returns whether the pointer was the one dragging.
    pub fn end(&mut self, pointer_id: i32) -> bool {
        if self.mode.is_some() && pointer_id == self.pointer_id {
            self.mode = None;
            return true;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }
}

// ---------------- Pointer helpers ----------------
#[inline]
pub fn pointer_css_px(client_x: f32, client_y: f32, rect_left: f32, rect_top: f32) -> Vec2 {
    Vec2::new(client_x - rect_left, client_y - rect_top)
}
