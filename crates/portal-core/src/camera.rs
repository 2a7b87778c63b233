//! Perspective camera and viewport sizing.
//!
//! These types avoid platform APIs; the web frontend feeds them window sizes
//! and reads back matrices and back-buffer dimensions.

use crate::config::{capped_pixel_ratio, CameraConfig};
use glam::{Mat4, Vec3};

/// Right-handed perspective camera looking at `target`.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: config.position,
            target: config.target,
            up: Vec3::Y,
            aspect,
            fov_deg: config.fov_deg,
            near: config.near,
            far: config.far,
        }
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_deg.to_radians()
    }

    /// Clip-space projection with a [0, 1] depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Camera basis vectors (right, up) in world space.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }
}

/// Back-buffer dimensions produced by a resize, with the CSS size the
/// element must be laid out at so one buffer pixel maps to `1 / pixel_ratio`
/// CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
    pub css_width: f32,
    pub css_height: f32,
}

/// CSS-pixel viewport size and device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub css_width: f32,
    pub css_height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(css_width: f32, css_height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.css_height > 0.0 {
            self.css_width / self.css_height
        } else {
            1.0
        }
    }

    pub fn surface_size(&self) -> SurfaceSize {
        let pixel_ratio = capped_pixel_ratio(self.device_pixel_ratio);
        SurfaceSize {
            width: ((self.css_width * pixel_ratio).floor() as u32).max(1),
            height: ((self.css_height * pixel_ratio).floor() as u32).max(1),
            pixel_ratio,
            css_width: self.css_width.max(0.0),
            css_height: self.css_height.max(0.0),
        }
    }

    /// Apply the viewport to the camera and return the back-buffer size.
    pub fn apply(&self, camera: &mut PerspectiveCamera) -> SurfaceSize {
        camera.aspect = self.aspect();
        self.surface_size()
    }
}
