// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod core_constants {
    include!("../crates/portal-core/src/constants.rs");
}

use constants::*;
use core_constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    // Camera frustum
    assert!(CAMERA_NEAR > 0.0);
    assert!(CAMERA_FAR > CAMERA_NEAR);
    assert!(CAMERA_FOV_DEG > 0.0 && CAMERA_FOV_DEG < 180.0);

    // Orbit limits
    assert!(CONTROLS_MIN_DISTANCE < CONTROLS_MAX_DISTANCE);
    assert!(CONTROLS_DAMPING > 0.0 && CONTROLS_DAMPING < 1.0);
    assert!(CONTROLS_MAX_POLAR > 0.0 && CONTROLS_MAX_POLAR < std::f32::consts::FRAC_PI_2);

    // Particles
    assert_eq!(FIREFLY_COUNT, 100);
    assert!(FIREFLY_HORIZONTAL_SPREAD > 0.0);
    assert!(FIREFLY_VERTICAL_SPREAD > 0.0);
    assert!(PORTAL_SPIN_RATE < 0.0);

    assert!(MAX_PIXEL_RATIO >= 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn camera_starts_inside_orbit_limits() {
    let [x, y, z] = CAMERA_START;
    let distance = (x * x + y * y + z * z).sqrt();
    assert!(distance >= CONTROLS_MIN_DISTANCE);
    assert!(distance <= CONTROLS_MAX_DISTANCE);
    // above the ground and not below the polar limit
    let polar = (y / distance).acos();
    assert!(polar <= CONTROLS_MAX_POLAR);
}

#[test]
fn model_node_names_are_unique() {
    let mut names = vec![BAKED_MESH_NODE, DISC_FRONT_NODE, DISC_BACK_NODE, PORTAL_POINTS_NODE];
    names.extend(BULB_NODES);
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn clear_color_is_a_hex_triplet() {
    let hex = CLEAR_COLOR_HEX.trim_start_matches('#');
    assert_eq!(hex.len(), 6);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn page_constants_are_consistent() {
    assert!(FPS_GRAPH_WIDTH_PX < PANEL_WIDTH_PX);
    assert!(FPS_GRAPH_HEIGHT_PX > 0);
    assert!(FPS_GRAPH_CEILING > 0.0);
    assert!(MSAA_SAMPLES == 1 || MSAA_SAMPLES == 4);
    assert!(CANVAS_SELECTOR.starts_with("canvas"));
    assert_ne!(PANEL_ID, ERROR_OVERLAY_ID);

    let buttons = [BUTTON_PRIMARY, BUTTON_MIDDLE, BUTTON_SECONDARY];
    for (i, a) in buttons.iter().enumerate() {
        for b in &buttons[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
