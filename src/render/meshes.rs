use super::helpers::{self, PipelineSpec};
use super::textures::SceneTextures;
use portal_core::{
    mesh_vertices, BlendMode, FlatGpu, LightMapGpu, Material, MaterialId, MeshVertex, ObjectUniforms,
    PortalScene, TextureSlot, FLAT_WGSL, LIGHT_MAP_WGSL,
};
use wgpu;
use wgpu::util::DeviceExt;

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

struct GpuMesh {
    name: String,
    material: MaterialId,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    object_buffer: wgpu::Buffer,
    object_bg: wgpu::BindGroup,
}

/// Pipeline and uniforms for one scene material, built from its blend mode
/// and depth-write flag the first time a mesh uses it.
struct MaterialBinding {
    id: MaterialId,
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    // light-map materials only: (base, light map)
    texture_slots: Option<(TextureSlot, TextureSlot)>,
    blended: bool,
}

/// Triangle meshes of the scene graph drawn with the light-map and flat
/// materials. Geometry is uploaded once per node name; uniforms every frame.
pub(crate) struct MeshPass {
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    light_map_shader: wgpu::ShaderModule,
    flat_shader: wgpu::ShaderModule,
    light_map_pl: wgpu::PipelineLayout,
    flat_pl: wgpu::PipelineLayout,
    object_bgl: wgpu::BindGroupLayout,
    light_map_bgl: wgpu::BindGroupLayout,
    flat_bgl: wgpu::BindGroupLayout,
    meshes: Vec<GpuMesh>,
    materials: Vec<MaterialBinding>,
}

impl MeshPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        camera_bgl: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let object_bgl = helpers::uniform_layout(device, "object_bgl");
        let flat_bgl = helpers::uniform_layout(device, "flat_bgl");
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let light_map_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light_map_bgl"),
            entries: &[
                helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let light_map_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("light_map_shader"),
            source: wgpu::ShaderSource::Wgsl(LIGHT_MAP_WGSL.into()),
        });
        let light_map_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("light_map_pl"),
            bind_group_layouts: &[camera_bgl, &object_bgl, &light_map_bgl],
            push_constant_ranges: &[],
        });
        let flat_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat_shader"),
            source: wgpu::ShaderSource::Wgsl(FLAT_WGSL.into()),
        });
        let flat_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat_pl"),
            bind_group_layouts: &[camera_bgl, &object_bgl, &flat_bgl],
            push_constant_ranges: &[],
        });

        Self {
            color_format,
            sample_count,
            light_map_shader,
            flat_shader,
            light_map_pl,
            flat_pl,
            object_bgl,
            light_map_bgl,
            flat_bgl,
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Upload mesh nodes that appeared since the last call and create the
    /// material bindings they refer to.
    pub(crate) fn sync(&mut self, device: &wgpu::Device, scene: &PortalScene, textures: &SceneTextures) {
        for node in scene.graph().iter() {
            let Some(mesh) = node.geometry.as_mesh() else {
                continue;
            };
            if mesh.indices.is_empty() || self.meshes.iter().any(|m| m.name == node.name) {
                continue;
            }
            let material = scene.materials().get(node.material);
            if !matches!(material, Material::LightMap(_) | Material::Flat(_)) {
                log::warn!("[render] mesh {} has a point material", node.name);
                continue;
            }
            self.ensure_material(device, node.material, material, textures);

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&mesh_vertices(mesh)),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let (object_buffer, object_bg) = helpers::uniform_binding(
                device,
                "object_uniforms",
                &self.object_bgl,
                &ObjectUniforms::new(node.transform.matrix()),
            );
            log::info!(
                "[render] mesh {} uploaded: {} vertices, {} indices",
                node.name,
                mesh.vertex_count(),
                mesh.indices.len()
            );
            self.meshes.push(GpuMesh {
                name: node.name.clone(),
                material: node.material,
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
                object_buffer,
                object_bg,
            });
        }
        // opaque meshes first, then the blended ones
        let materials = &self.materials;
        self.meshes
            .sort_by_key(|m| find(materials, m.material).is_some_and(|b| b.blended));
    }

    fn pipeline(&self, device: &wgpu::Device, material: Material<'_>) -> Option<wgpu::RenderPipeline> {
        let (label, layout, shader) = match material {
            Material::LightMap(_) => ("light_map_pipeline", &self.light_map_pl, &self.light_map_shader),
            Material::Flat(_) => ("flat_pipeline", &self.flat_pl, &self.flat_shader),
            Material::Points(_) | Material::Fireflies(_) => return None,
        };
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        }];
        Some(helpers::make_scene_pipeline(
            device,
            PipelineSpec {
                label,
                layout,
                shader,
                buffers: &buffers,
                color_format: self.color_format,
                blend: helpers::blend_state(material.blend()),
                cull_mode: Some(wgpu::Face::Back),
                depth_write: material.depth_write(),
                sample_count: self.sample_count,
            },
        ))
    }

    fn ensure_material(
        &mut self,
        device: &wgpu::Device,
        id: MaterialId,
        material: Material<'_>,
        textures: &SceneTextures,
    ) {
        if find(&self.materials, id).is_some() {
            return;
        }
        let Some(pipeline) = self.pipeline(device, material) else {
            return;
        };
        let (buffer, bind_group, texture_slots) = match material {
            Material::LightMap(u) => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("light_map_uniforms"),
                    contents: bytemuck::bytes_of(&LightMapGpu::from(u)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let slots = (u.baked_texture, u.light_map_texture);
                let bind_group =
                    light_map_bind_group(device, &self.light_map_bgl, &buffer, textures, slots);
                (buffer, bind_group, Some(slots))
            }
            Material::Flat(m) => {
                let (buffer, bind_group) =
                    helpers::uniform_binding(device, "flat_uniforms", &self.flat_bgl, &FlatGpu::from(m));
                (buffer, bind_group, None)
            }
            Material::Points(_) | Material::Fireflies(_) => return,
        };
        log::debug!("[render] material {:?} bound, blend {:?}", id, material.blend());
        self.materials.push(MaterialBinding {
            id,
            pipeline,
            buffer,
            bind_group,
            texture_slots,
            blended: material.blend() != BlendMode::Opaque,
        });
    }

    /// Point light-map bind groups at the current texture views.
    pub(crate) fn rebind_textures(&mut self, device: &wgpu::Device, textures: &SceneTextures) {
        for binding in &mut self.materials {
            if let Some(slots) = binding.texture_slots {
                binding.bind_group =
                    light_map_bind_group(device, &self.light_map_bgl, &binding.buffer, textures, slots);
            }
        }
    }

    pub(crate) fn write_uniforms(&self, queue: &wgpu::Queue, scene: &PortalScene) {
        for mesh in &self.meshes {
            if let Some(node) = scene.graph().get(&mesh.name) {
                let object = ObjectUniforms::new(node.transform.matrix());
                queue.write_buffer(&mesh.object_buffer, 0, bytemuck::bytes_of(&object));
            }
        }
        for binding in &self.materials {
            match scene.materials().get(binding.id) {
                Material::LightMap(u) => {
                    queue.write_buffer(&binding.buffer, 0, bytemuck::bytes_of(&LightMapGpu::from(u)));
                }
                Material::Flat(m) => {
                    queue.write_buffer(&binding.buffer, 0, bytemuck::bytes_of(&FlatGpu::from(m)));
                }
                Material::Points(_) | Material::Fireflies(_) => {}
            }
        }
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, camera_bg: &wgpu::BindGroup) {
        rpass.set_bind_group(0, camera_bg, &[]);
        for mesh in &self.meshes {
            let Some(binding) = find(&self.materials, mesh.material) else {
                continue;
            };
            rpass.set_pipeline(&binding.pipeline);
            rpass.set_bind_group(1, &mesh.object_bg, &[]);
            rpass.set_bind_group(2, &binding.bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

fn light_map_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    textures: &SceneTextures,
    (base, light_map): (TextureSlot, TextureSlot),
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("light_map_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(textures.view(base)),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(textures.view(light_map)),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&textures.sampler),
            },
        ],
    })
}

fn find(materials: &[MaterialBinding], id: MaterialId) -> Option<&MaterialBinding> {
    materials.iter().find(|b| b.id == id)
}
