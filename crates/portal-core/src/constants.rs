// Shared scene tuning constants used by the core and the web frontend.

// Node names baked into model.glb
pub const BAKED_MESH_NODE: &str = "bakedMesh";
pub const DISC_FRONT_NODE: &str = "Disc-front";
pub const DISC_BACK_NODE: &str = "Disc-back";
pub const BULB_NODES: [&str; 4] = ["bulb-l1", "bulb-l2", "bulb-r1", "bulb-r2"];
pub const PORTAL_POINTS_NODE: &str = "points";

// Renderer clear color until the background is first changed
pub const CLEAR_COLOR_HEX: &str = "#18142c";

// Pixel density cap for the back-buffer
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// Portal particles
pub const PORTAL_SPIN_RATE: f32 = -0.05; // radians per second around local X

// Fireflies
pub const FIREFLY_COUNT: usize = 100;
pub const FIREFLY_HORIZONTAL_SPREAD: f32 = 20.0;
pub const FIREFLY_VERTICAL_SPREAD: f32 = 8.0;
pub const FIREFLY_SIZE: f32 = 140.0;

// Camera
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: [f32; 3] = [10.0, 5.0, 10.0];

// Orbit controls
pub const CONTROLS_DAMPING: f32 = 0.04;
pub const CONTROLS_MIN_DISTANCE: f32 = 5.0;
pub const CONTROLS_MAX_DISTANCE: f32 = 60.0;
pub const CONTROLS_MAX_POLAR: f32 = std::f32::consts::PI / 2.5;

// Diagnostics
pub const FPS_REFRESH_MS: f64 = 500.0;
pub const FPS_HISTORY: usize = 120;
