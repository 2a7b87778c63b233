//! Material and uniform state for the four shader programs.
//!
//! The scene owns exactly one of each material in `SceneMaterials`. Nodes
//! name theirs with a `MaterialId`, so nodes that share an id (the four
//! bulbs) see every edit at once.

use crate::color::Color;

/// Which of the scene's materials a node draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialId {
    LightMap,
    PoleLight,
    PortalPoints,
    Fireflies,
}

/// Which baked image a sampler binding refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Baked,
    LightMap,
}

/// Uniform set of the baked light-map shader.
#[derive(Clone, Debug, PartialEq)]
pub struct LightMapUniforms {
    pub time: f32,
    pub portal_strength: f32,
    pub portal_color: Color,
    pub pole_strength: f32,
    pub pole_color: Color,
    /// Image sampled for the base color.
    pub baked_texture: TextureSlot,
    /// Image whose channels mask the portal and pole glow.
    pub light_map_texture: TextureSlot,
}

/// Unlit single-color material (bulbs).
#[derive(Clone, Debug, PartialEq)]
pub struct FlatMaterial {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
}

/// Size-attenuated sprite material for the portal cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct PointsMaterial {
    pub color: Color,
    pub size: f32,
    pub transparent: bool,
}

/// Uniform set of the firefly shader.
#[derive(Clone, Debug, PartialEq)]
pub struct FireflyUniforms {
    pub time: f32,
    pub pixel_ratio: f32,
    pub size: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    Alpha,
    Additive,
}

/// Borrowed view of one scene material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material<'a> {
    LightMap(&'a LightMapUniforms),
    Flat(&'a FlatMaterial),
    Points(&'a PointsMaterial),
    Fireflies(&'a FireflyUniforms),
}

impl Material<'_> {
    pub fn blend(&self) -> BlendMode {
        match self {
            Material::LightMap(_) => BlendMode::Opaque,
            Material::Flat(m) if m.transparent => BlendMode::Alpha,
            Material::Flat(_) => BlendMode::Opaque,
            Material::Points(m) if m.transparent => BlendMode::Alpha,
            Material::Points(_) => BlendMode::Opaque,
            Material::Fireflies(_) => BlendMode::Additive,
        }
    }

    /// Fireflies glow through each other, everything else occludes.
    pub fn depth_write(&self) -> bool {
        !matches!(self, Material::Fireflies(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneMaterials {
    pub light_map: LightMapUniforms,
    pub pole_light: FlatMaterial,
    pub portal_points: PointsMaterial,
    pub fireflies: FireflyUniforms,
}

impl SceneMaterials {
    pub fn get(&self, id: MaterialId) -> Material<'_> {
        match id {
            MaterialId::LightMap => Material::LightMap(&self.light_map),
            MaterialId::PoleLight => Material::Flat(&self.pole_light),
            MaterialId::PortalPoints => Material::Points(&self.portal_points),
            MaterialId::Fireflies => Material::Fireflies(&self.fireflies),
        }
    }
}
