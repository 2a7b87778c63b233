//! Uniform and vertex layouts shared with the WGSL shaders.
//!
//! Every struct here mirrors a WGSL struct field for field. Uniform structs
//! are sized in multiples of 16 bytes so they bind as uniform buffers directly.

use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::materials::{FireflyUniforms, FlatMaterial, LightMapUniforms, PointsMaterial};
use crate::scene::MeshGeometry;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// sRGB-encoded component to linear.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Panel colors are authored in sRGB; shaders write to an sRGB target and
/// expect linear inputs.
pub fn linear_rgba(color: Color, alpha: f32) -> [f32; 4] {
    [
        srgb_to_linear(color.r),
        srgb_to_linear(color.g),
        srgb_to_linear(color.b),
        alpha,
    ]
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub pixel_ratio: f32,
    pub _pad: f32,
}

impl CameraUniforms {
    pub fn new(camera: &PerspectiveCamera, width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            resolution: [width.max(1) as f32, height.max(1) as f32],
            pixel_ratio,
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightMapGpu {
    pub portal_color: [f32; 4],
    pub pole_color: [f32; 4],
    pub time: f32,
    pub portal_strength: f32,
    pub pole_strength: f32,
    pub _pad: f32,
}

impl From<&LightMapUniforms> for LightMapGpu {
    fn from(u: &LightMapUniforms) -> Self {
        Self {
            portal_color: linear_rgba(u.portal_color, 1.0),
            pole_color: linear_rgba(u.pole_color, 1.0),
            time: u.time,
            portal_strength: u.portal_strength,
            pole_strength: u.pole_strength,
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FlatGpu {
    pub color: [f32; 4],
}

impl From<&FlatMaterial> for FlatGpu {
    fn from(m: &FlatMaterial) -> Self {
        Self {
            color: linear_rgba(m.color, m.opacity),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PointsGpu {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub size: f32,
    pub _pad: [f32; 3],
}

impl PointsGpu {
    pub fn new(material: &PointsMaterial, model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: linear_rgba(material.color, 1.0),
            size: material.size,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FireflyGpu {
    pub time: f32,
    pub pixel_ratio: f32,
    pub size: f32,
    pub _pad: f32,
}

impl From<&FireflyUniforms> for FireflyGpu {
    fn from(u: &FireflyUniforms) -> Self {
        Self {
            time: u.time,
            pixel_ratio: u.pixel_ratio,
            size: u.size,
            _pad: 0.0,
        }
    }
}

/// Interleaved mesh vertex: position then uv0.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

pub fn mesh_vertices(mesh: &MeshGeometry) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| MeshVertex {
            position: p.to_array(),
            uv: mesh.uvs.get(i).copied().unwrap_or_default().to_array(),
        })
        .collect()
}

/// Per-instance data of a point sprite; `scale` is 1 for clouds without
/// per-point scalars.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub scale: f32,
}

pub fn point_instances(positions: &[Vec3], scales: &[f32]) -> Vec<PointInstance> {
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| PointInstance {
            position: p.to_array(),
            scale: scales.get(i).copied().unwrap_or(1.0),
        })
        .collect()
}
