pub mod assets;
pub mod bindings;
pub mod camera;
pub mod clock;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod materials;
pub mod orbit;
pub mod params;
pub mod particles;
pub mod scene;
pub mod stats;

pub static LIGHT_MAP_WGSL: &str = include_str!("../shaders/light_map.wgsl");
pub static FLAT_WGSL: &str = include_str!("../shaders/flat.wgsl");
pub static POINTS_WGSL: &str = include_str!("../shaders/points.wgsl");
pub static FIREFLIES_WGSL: &str = include_str!("../shaders/fireflies.wgsl");

pub use assets::*;
pub use bindings::*;
pub use camera::*;
pub use clock::*;
pub use color::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use gpu::*;
pub use materials::*;
pub use orbit::*;
pub use params::*;
pub use particles::*;
pub use scene::*;
pub use stats::*;
