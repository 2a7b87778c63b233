//! Orbit / zoom / pan camera controls with damping.
//!
//! Input handlers only accumulate deltas; `update` applies a damped share of
//! them to the camera once per frame and decays the rest.

use crate::camera::PerspectiveCamera;
use crate::config::ControlsConfig;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    // phi measured from +Y, theta around Y starting at +Z
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    config: ControlsConfig,
    target: Vec3,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig, target: Vec3) -> Self {
        Self {
            config,
            target,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Pointer drag in CSS pixels; a full element height turns a full circle.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, element_height: f32) {
        if !self.config.enable_rotate || element_height <= 0.0 {
            return;
        }
        let speed = self.config.rotate_speed;
        self.rotate_left(TAU * dx / element_height * speed);
        self.rotate_up(TAU * dy / element_height * speed);
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.config.zoom_speed)
    }

    /// Wheel input; negative `delta_y` moves closer.
    pub fn zoom_by_wheel(&mut self, delta_y: f32) {
        if !self.config.enable_zoom || delta_y == 0.0 {
            return;
        }
        if delta_y < 0.0 {
            self.scale *= self.zoom_scale();
        } else {
            self.scale /= self.zoom_scale();
        }
    }

    /// Screen-space pan in CSS pixels.
    pub fn pan_by_pixels(
        &mut self,
        dx: f32,
        dy: f32,
        element_height: f32,
        camera: &PerspectiveCamera,
    ) {
        if !self.config.enable_pan || element_height <= 0.0 {
            return;
        }
        let offset = camera.position - self.target;
        let distance = offset.length() * (camera.fov_radians() * 0.5).tan();
        let (right, up) = camera.basis();
        let speed = self.config.pan_speed;
        self.pan_offset -= right * (2.0 * dx * distance / element_height * speed);
        self.pan_offset += up * (2.0 * dy * distance / element_height * speed);
    }

    /// Apply pending input to the camera. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let damping = self.config.damping_factor.clamp(0.0, 1.0);
        let share = if damping > 0.0 { damping } else { 1.0 };

        let mut s = Spherical::from_offset(camera.position - self.target);
        s.theta += self.delta_theta * share;
        s.phi += self.delta_phi * share;
        s.phi = s
            .phi
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle)
            .clamp(EPS, PI - EPS);
        s.radius = (s.radius * self.scale).clamp(self.config.min_distance, self.config.max_distance);

        self.target += self.pan_offset * share;

        let before = camera.position;
        camera.position = self.target + s.to_offset();
        camera.target = self.target;

        if damping > 0.0 {
            self.delta_theta *= 1.0 - damping;
            self.delta_phi *= 1.0 - damping;
            self.pan_offset *= 1.0 - damping;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        before.distance_squared(camera.position) > EPS
    }
}
