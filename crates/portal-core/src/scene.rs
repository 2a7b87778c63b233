//! Retained scene graph: named nodes with a transform, geometry and material.

use crate::color::Color;
use crate::materials::MaterialId;
use crate::particles::PointCloud;
use fnv::FnvHashMap;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Translation, XYZ Euler rotation (radians) and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_translation_rotation(translation: Vec3, rotation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

/// Indexed triangle geometry in node-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Mesh(MeshGeometry),
    Points(PointCloud),
}

impl Geometry {
    pub fn as_points(&self) -> Option<&PointCloud> {
        match self {
            Geometry::Points(p) => Some(p),
            Geometry::Mesh(_) => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshGeometry> {
        match self {
            Geometry::Mesh(m) => Some(m),
            Geometry::Points(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub geometry: Geometry,
    pub material: MaterialId,
}

/// Scene nodes in insertion order with a by-name index. Names are unique:
/// adding a node under an existing name replaces the old node entirely.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    index: FnvHashMap<String, usize>,
    background: Option<Color>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning the node it replaced if the name was taken.
    pub fn add(&mut self, node: Node) -> Option<Node> {
        match self.index.get(&node.name) {
            Some(&i) => Some(std::mem::replace(&mut self.nodes[i], node)),
            None => {
                self.index.insert(node.name.clone(), self.nodes.len());
                self.nodes.push(node);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let i = self.index.remove(name)?;
        let node = self.nodes.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(node)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.index.get(name).map(|&i| &mut self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Explicit background; `None` leaves the renderer's clear color.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = Some(color);
    }
}
