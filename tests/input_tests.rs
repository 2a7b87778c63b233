// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use input::*;

#[test]
fn buttons_map_to_drag_modes() {
    assert_eq!(drag_mode(0, false, false), Some(DragMode::Rotate));
    assert_eq!(drag_mode(1, false, false), Some(DragMode::Dolly));
    assert_eq!(drag_mode(2, false, false), Some(DragMode::Pan));
    assert_eq!(drag_mode(3, false, false), None);
    assert_eq!(drag_mode(-1, false, false), None);
}

#[test]
fn modifiers_turn_primary_drag_into_pan() {
    assert_eq!(drag_mode(0, true, false), Some(DragMode::Pan));
    assert_eq!(drag_mode(0, false, true), Some(DragMode::Pan));
    // other buttons ignore modifiers
    assert_eq!(drag_mode(1, true, true), Some(DragMode::Dolly));
}

#[test]
fn drag_reports_deltas_between_moves() {
    let mut drag = DragState::default();
    assert!(!drag.is_active());
    assert_eq!(drag.step(1, Vec2::new(5.0, 5.0)), None);

    drag.begin(DragMode::Rotate, 1, Vec2::new(10.0, 10.0));
    assert!(drag.is_active());

    let (mode, delta) = drag.step(1, Vec2::new(14.0, 7.0)).unwrap();
    assert_eq!(mode, DragMode::Rotate);
    assert_eq!(delta, Vec2::new(4.0, -3.0));

    let (_, delta) = drag.step(1, Vec2::new(14.0, 9.0)).unwrap();
    assert_eq!(delta, Vec2::new(0.0, 2.0));
}

#[test]
fn other_pointers_do_not_move_or_end_the_drag() {
    let mut drag = DragState::default();
    drag.begin(DragMode::Pan, 7, Vec2::ZERO);

    assert_eq!(drag.step(8, Vec2::new(50.0, 50.0)), None);
    assert!(!drag.end(8));
    assert!(drag.is_active());

    // the ignored move did not update the anchor
    let (_, delta) = drag.step(7, Vec2::new(1.0, 1.0)).unwrap();
    assert_eq!(delta, Vec2::new(1.0, 1.0));

    assert!(drag.end(7));
    assert!(!drag.is_active());
    assert!(!drag.end(7));
}

#[test]
fn pointer_css_px_is_relative_to_element() {
    let p = pointer_css_px(120.0, 80.0, 20.0, 30.0);
    assert_eq!(p, Vec2::new(100.0, 50.0));
}
