//! Binds the loaded model and the live parameters to scene materials.
//!
//! `PortalScene` exists from startup: its materials and the firefly cloud do
//! not depend on the model. `bind_model` attaches the named meshes once the
//! model arrives, and `apply` is the single handler for parameter changes.

use crate::assets::{Model, ModelNode};
use crate::clock::FrameTime;
use crate::color::Color;
use crate::config::SceneConfig;
use crate::constants::*;
use crate::error::BindError;
use crate::materials::*;
use crate::params::{ParamChange, ParamKey, SceneParams};
use crate::particles::{generate_fireflies, PointCloud, PortalEmitter};
use crate::scene::{Geometry, MeshGeometry, Node, SceneGraph, Transform};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const FIREFLIES_NODE: &str = "fireflies";

/// Every node name the model must provide.
pub fn expected_nodes() -> impl Iterator<Item = &'static str> {
    [BAKED_MESH_NODE, DISC_FRONT_NODE, DISC_BACK_NODE]
        .into_iter()
        .chain(BULB_NODES)
}

/// What `bind_model` attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundNodes {
    pub meshes: Vec<String>,
    pub portal_source_points: usize,
    pub portal_points: usize,
}

pub struct PortalScene {
    graph: SceneGraph,
    materials: SceneMaterials,
    portal: Option<PortalEmitter>,
    spin_rate: f32,
    clear_color: Color,
    rng: StdRng,
}

impl PortalScene {
    pub fn new(config: &SceneConfig, params: &SceneParams) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let materials = SceneMaterials {
            light_map: LightMapUniforms {
                time: 0.0,
                portal_strength: params.portal_strength,
                portal_color: params.portal_color,
                pole_strength: params.pole_strength,
                pole_color: params.pole_color,
                baked_texture: TextureSlot::Baked,
                light_map_texture: TextureSlot::LightMap,
            },
            pole_light: FlatMaterial {
                color: params.pole_color,
                opacity: 1.0,
                transparent: true,
            },
            portal_points: PointsMaterial {
                color: params.portal_color,
                size: params.point_size,
                transparent: true,
            },
            fireflies: FireflyUniforms {
                time: 0.0,
                pixel_ratio: config.capped_pixel_ratio(),
                size: config.fireflies.size,
            },
        };

        let mut graph = SceneGraph::new();
        let fireflies = generate_fireflies(&config.fireflies, &mut rng);
        log::info!("[scene] fireflies generated: {}", fireflies.len());
        graph.add(Node {
            name: FIREFLIES_NODE.to_string(),
            transform: Transform::IDENTITY,
            geometry: Geometry::Points(fireflies),
            material: MaterialId::Fireflies,
        });

        Self {
            graph,
            materials,
            portal: None,
            spin_rate: config.portal_spin_rate,
            clear_color: config.clear_color,
            rng,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn materials(&self) -> &SceneMaterials {
        &self.materials
    }

    pub fn light_map(&self) -> &LightMapUniforms {
        &self.materials.light_map
    }

    pub fn pole_light(&self) -> &FlatMaterial {
        &self.materials.pole_light
    }

    pub fn points_material(&self) -> &PointsMaterial {
        &self.materials.portal_points
    }

    pub fn firefly_uniforms(&self) -> &FireflyUniforms {
        &self.materials.fireflies
    }

    pub fn fireflies(&self) -> Option<&PointCloud> {
        self.graph.get(FIREFLIES_NODE)?.geometry.as_points()
    }

    pub fn portal_points(&self) -> Option<&Node> {
        self.graph.get(PORTAL_POINTS_NODE)
    }

    pub fn is_bound(&self) -> bool {
        self.portal.is_some()
    }

    /// Background to clear with: the panel's color once set, otherwise the
    /// configured clear color.
    pub fn clear_color(&self) -> Color {
        self.graph.background().unwrap_or(self.clear_color)
    }

    /// Attach the model's named meshes. Fails without touching the scene if
    /// any expected node is absent.
    pub fn bind_model(
        &mut self,
        model: &Model,
        params: &SceneParams,
    ) -> Result<BoundNodes, BindError> {
        let missing: Vec<String> = expected_nodes()
            .filter(|name| model.find_child(name).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            log::error!("[bind] missing nodes: {:?}", missing);
            return Err(BindError::MissingNodes(missing));
        }

        let baked = mesh_of(model, BAKED_MESH_NODE)?;
        let disc_front = find(model, DISC_FRONT_NODE)?;
        let disc_source = mesh_of(model, DISC_FRONT_NODE)?.positions.clone();
        // looked up for completeness; never rendered
        let _disc_back = find(model, DISC_BACK_NODE)?;
        let mut bulbs = Vec::with_capacity(BULB_NODES.len());
        for name in BULB_NODES {
            bulbs.push((find(model, name)?, mesh_of(model, name)?));
        }

        let mut meshes = Vec::with_capacity(1 + bulbs.len());
        self.graph.add(Node {
            name: BAKED_MESH_NODE.to_string(),
            transform: find(model, BAKED_MESH_NODE)?.transform,
            geometry: Geometry::Mesh(baked.clone()),
            material: MaterialId::LightMap,
        });
        meshes.push(BAKED_MESH_NODE.to_string());
        for (node, mesh) in bulbs {
            self.graph.add(Node {
                name: node.name.clone(),
                transform: node.transform,
                geometry: Geometry::Mesh(mesh.clone()),
                material: MaterialId::PoleLight,
            });
            meshes.push(node.name.clone());
        }

        let emitter = PortalEmitter::new(disc_source, disc_front.transform);
        let portal_source_points = emitter.source().len();
        self.portal = Some(emitter);
        let portal_points = self.regenerate_portal(params.portal_density);
        log::info!(
            "[bind] bound {} meshes, portal source {} points",
            meshes.len(),
            portal_source_points
        );
        Ok(BoundNodes {
            meshes,
            portal_source_points,
            portal_points,
        })
    }

    /// Replace the portal cloud with a fresh sample. Returns the new count,
    /// or 0 before the model is bound.
    pub fn regenerate_portal(&mut self, density: f32) -> usize {
        let Some(emitter) = &self.portal else {
            return 0;
        };
        let (cloud, transform) = emitter.emit(density, &mut self.rng);
        let count = cloud.len();
        self.graph.remove(PORTAL_POINTS_NODE);
        self.graph.add(Node {
            name: PORTAL_POINTS_NODE.to_string(),
            transform,
            geometry: Geometry::Points(cloud),
            material: MaterialId::PortalPoints,
        });
        log::debug!("[scene] portal points regenerated: {} at density {:.4}", count, density);
        count
    }

    /// Push one parameter change into uniforms, materials or geometry.
    pub fn apply(&mut self, change: &ParamChange, params: &SceneParams) {
        match change.key {
            ParamKey::SceneColor => self.graph.set_background(params.scene_color),
            ParamKey::PortalStrength | ParamKey::PortalColor => {
                self.materials.light_map.portal_strength = params.portal_strength;
                self.materials.light_map.portal_color = params.portal_color;
                self.materials.portal_points.color = params.portal_color;
            }
            ParamKey::PoleStrength | ParamKey::PoleColor => {
                self.materials.light_map.pole_strength = params.pole_strength;
                self.materials.light_map.pole_color = params.pole_color;
                self.materials.pole_light.color = params.pole_color;
            }
            ParamKey::PointSize => self.materials.portal_points.size = params.point_size,
            ParamKey::PortalDensity => {
                self.regenerate_portal(params.portal_density);
            }
        }
    }

    /// Per-frame animation: spin the portal cloud and feed time to fireflies.
    pub fn advance(&mut self, time: FrameTime) {
        if let Some(node) = self.graph.get_mut(PORTAL_POINTS_NODE) {
            node.transform.rotation.x += self.spin_rate * time.delta;
        }
        self.materials.fireflies.time = time.elapsed;
    }
}

fn find<'m>(model: &'m Model, name: &str) -> Result<&'m ModelNode, BindError> {
    model
        .find_child(name)
        .ok_or_else(|| BindError::MissingNodes(vec![name.to_string()]))
}

fn mesh_of<'m>(model: &'m Model, name: &str) -> Result<&'m MeshGeometry, BindError> {
    find(model, name)?
        .mesh
        .as_ref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| BindError::MissingGeometry(name.to_string()))
}
