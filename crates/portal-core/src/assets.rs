//! Model and texture decoding.
//!
//! Fetching is abstracted behind [`AssetSource`]; the web frontend implements
//! it with `window.fetch`, tests with [`MemorySource`].

use crate::error::LoadError;
use crate::scene::{MeshGeometry, Transform};
use fnv::FnvHashMap;
use glam::{EulerRot, Quat, Vec2, Vec3};

/// Byte provider for asset paths.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError>;
}

/// In-memory asset source keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: FnvHashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }
}

impl AssetSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::fetch(path, "not found"))
    }
}

/// A top-level node of the model's scene.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshGeometry>,
}

/// Decoded model: the top-level children of its default scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    nodes: Vec<ModelNode>,
}

impl Model {
    pub fn new(nodes: Vec<ModelNode>) -> Self {
        Self { nodes }
    }

    /// Parse a glTF binary (`.glb`) with its buffer embedded in the BIN chunk.
    pub fn from_glb(bytes: &[u8]) -> Result<Self, LoadError> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let blob = gltf.blob.as_deref();
        let scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .ok_or(LoadError::NoScene)?;
        let nodes = scene
            .nodes()
            .map(|node| read_node(&node, blob))
            .collect::<Vec<_>>();
        log::info!("[assets] model parsed: {} top-level nodes", nodes.len());
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    pub fn find_child(&self, name: &str) -> Option<&ModelNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

fn read_node(node: &gltf::Node<'_>, blob: Option<&[u8]>) -> ModelNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let (rx, ry, rz) = Quat::from_array(rotation).to_euler(EulerRot::XYZ);
    ModelNode {
        name: node.name().unwrap_or_default().to_string(),
        transform: Transform {
            translation: Vec3::from_array(translation),
            rotation: Vec3::new(rx, ry, rz),
            scale: Vec3::from_array(scale),
        },
        mesh: node.mesh().map(|mesh| read_mesh(&mesh, blob)),
    }
}

// All triangle primitives of the mesh merged into one geometry.
fn read_mesh(mesh: &gltf::Mesh<'_>, blob: Option<&[u8]>) -> MeshGeometry {
    let mut out = MeshGeometry::default();
    for prim in mesh.primitives() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = prim.reader(|buffer| match buffer.source() {
            gltf::buffer::Source::Bin => blob,
            gltf::buffer::Source::Uri(_) => None,
        });
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let base = out.positions.len() as u32;
        out.positions.extend(positions.map(Vec3::from_array));
        let added = out.positions.len() - base as usize;

        match reader.read_tex_coords(0) {
            Some(uvs) => out.uvs.extend(uvs.into_f32().map(Vec2::from_array)),
            None => out.uvs.extend(std::iter::repeat(Vec2::ZERO).take(added)),
        }
        // keep uvs aligned with positions even for malformed primitives
        out.uvs.resize(out.positions.len(), Vec2::ZERO);

        match reader.read_indices() {
            Some(indices) => out.indices.extend(indices.into_u32().map(|i| i + base)),
            None => {
                let tri = (added / 3 * 3) as u32;
                out.indices.extend((0..tri).map(|i| i + base));
            }
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// How a raster image is interpreted when uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    pub color_space: ColorSpace,
    pub flip_y: bool,
}

impl TextureOptions {
    /// Baked maps: sRGB, and glTF UVs already match image row order.
    pub const BAKED: TextureOptions = TextureOptions {
        color_space: ColorSpace::Srgb,
        flip_y: false,
    };
}

/// Decoded RGBA8 image.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub options: TextureOptions,
}

impl TextureImage {
    pub fn decode(bytes: &[u8], options: TextureOptions) -> Result<Self, LoadError> {
        let mut img = image::load_from_memory(bytes)?.to_rgba8();
        if options.flip_y {
            image::imageops::flip_vertical_in_place(&mut img);
        }
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
            options,
        })
    }

    /// 1x1 stand-in used until the real image arrives.
    pub fn solid(rgba: [u8; 4], options: TextureOptions) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
            options,
        }
    }
}

pub async fn load_model<S: AssetSource>(source: &S, path: &str) -> Result<Model, LoadError> {
    let bytes = source.fetch(path).await?;
    log::info!("[assets] fetched {} ({} bytes)", path, bytes.len());
    Model::from_glb(&bytes)
}

pub async fn load_texture<S: AssetSource>(
    source: &S,
    path: &str,
    options: TextureOptions,
) -> Result<TextureImage, LoadError> {
    let bytes = source.fetch(path).await?;
    let tex = TextureImage::decode(&bytes, options)?;
    log::info!("[assets] texture {} decoded {}x{}", path, tex.width, tex.height);
    Ok(tex)
}
