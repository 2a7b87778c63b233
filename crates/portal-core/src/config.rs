//! Startup configuration for the scene.
//!
//! Every field defaults to the values in `constants.rs`; the web frontend uses
//! `SceneConfig::default()` and tests shrink or reshape pieces as needed.

use crate::color::Color;
use crate::constants::*;
use glam::Vec3;

/// Paths of the three assets, relative to the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetManifest {
    pub model: String,
    pub baked_texture: String,
    pub light_map_texture: String,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            model: "model.glb".to_string(),
            baked_texture: "BakedMap.jpg".to_string(),
            light_map_texture: "LightMap.jpg".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: CAMERA_FOV_DEG,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            position: Vec3::from_array(CAMERA_START),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ControlsConfig {
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: CONTROLS_DAMPING,
            min_distance: CONTROLS_MIN_DISTANCE,
            max_distance: CONTROLS_MAX_DISTANCE,
            min_polar_angle: 0.0,
            max_polar_angle: CONTROLS_MAX_POLAR,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
        }
    }
}

/// Volume and count of the ambient firefly cloud.
#[derive(Clone, Debug)]
pub struct FireflyField {
    pub count: usize,
    pub horizontal_spread: f32,
    pub vertical_spread: f32,
    pub size: f32,
}

impl Default for FireflyField {
    fn default() -> Self {
        Self {
            count: FIREFLY_COUNT,
            horizontal_spread: FIREFLY_HORIZONTAL_SPREAD,
            vertical_spread: FIREFLY_VERTICAL_SPREAD,
            size: FIREFLY_SIZE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub assets: AssetManifest,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub fireflies: FireflyField,
    pub portal_spin_rate: f32,
    pub clear_color: Color,
    /// Device pixel ratio before capping; fed to the firefly shader once.
    pub device_pixel_ratio: f32,
    /// Seed for particle generation; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets: AssetManifest::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            fireflies: FireflyField::default(),
            portal_spin_rate: PORTAL_SPIN_RATE,
            clear_color: Color::from_hex(CLEAR_COLOR_HEX).unwrap_or(Color::BLACK),
            device_pixel_ratio: 1.0,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Pixel ratio actually used for rendering, capped at 2x.
    pub fn capped_pixel_ratio(&self) -> f32 {
        capped_pixel_ratio(self.device_pixel_ratio)
    }
}

#[inline]
pub fn capped_pixel_ratio(device_pixel_ratio: f32) -> f32 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}
