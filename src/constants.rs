// DOM and renderer tuning for the web frontend. Scene values live in
// portal_core::constants.

// Page elements
pub const CANVAS_SELECTOR: &str = "canvas.webgl";
pub const PANEL_ID: &str = "tweak-panel";
pub const ERROR_OVERLAY_ID: &str = "error-overlay";

// Floating parameter panel
pub const PANEL_WIDTH_PX: u32 = 280;

// Fps graph drawn at the top of the panel
pub const FPS_GRAPH_WIDTH_PX: u32 = 264;
pub const FPS_GRAPH_HEIGHT_PX: u32 = 48;
pub const FPS_GRAPH_CEILING: f32 = 120.0; // fps mapped to the top edge

// Multisampling for the scene pass
pub const MSAA_SAMPLES: u32 = 4;

// Pointer buttons (MouseEvent.button)
pub const BUTTON_PRIMARY: i16 = 0;
pub const BUTTON_MIDDLE: i16 = 1;
pub const BUTTON_SECONDARY: i16 = 2;
