use super::helpers::{self, PipelineSpec};
use portal_core::{
    point_instances, FireflyGpu, Material, MaterialId, PointCloud, PointInstance, PointsGpu,
    PortalScene, FIREFLIES_WGSL, POINTS_WGSL,
};
use bytemuck::Zeroable;
use wgpu;
use wgpu::util::DeviceExt;

const PORTAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const FIREFLY_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];

// two triangles per sprite, corners picked by vertex_index in the shader
const QUAD_VERTICES: u32 = 6;

/// Instance buffer mirroring one point cloud, rebuilt when the cloud's
/// generation changes.
#[derive(Default)]
struct InstanceBuffer {
    generation: u64,
    buffer: Option<wgpu::Buffer>,
    count: u32,
}

impl InstanceBuffer {
    fn sync(&mut self, device: &wgpu::Device, label: &str, cloud: Option<&PointCloud>) {
        let Some(cloud) = cloud else {
            *self = Self::default();
            return;
        };
        if self.buffer.is_some() && cloud.generation() == self.generation {
            return;
        }
        self.generation = cloud.generation();
        self.count = cloud.len() as u32;
        self.buffer = (!cloud.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&point_instances(cloud.positions(), cloud.scales())),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });
        log::debug!("[render] {} rebuilt: {} points", label, self.count);
    }

    fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        if let Some(buffer) = &self.buffer {
            rpass.set_vertex_buffer(0, buffer.slice(..));
            rpass.draw(0..QUAD_VERTICES, 0..self.count);
        }
    }
}

/// Sprite shader plus the pipeline built from its material's blend mode,
/// created on the first sync that sees the material.
struct SpritePipeline {
    label: &'static str,
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    attributes: &'static [wgpu::VertexAttribute],
    pipeline: Option<wgpu::RenderPipeline>,
}

impl SpritePipeline {
    fn new(
        device: &wgpu::Device,
        label: &'static str,
        source: &'static str,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        attributes: &'static [wgpu::VertexAttribute],
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts,
            push_constant_ranges: &[],
        });
        Self {
            label,
            shader,
            layout,
            attributes,
            pipeline: None,
        }
    }

    fn ensure(
        &mut self,
        device: &wgpu::Device,
        material: Material<'_>,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) {
        if self.pipeline.is_some() {
            return;
        }
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: self.attributes,
        }];
        self.pipeline = Some(helpers::make_scene_pipeline(
            device,
            PipelineSpec {
                label: self.label,
                layout: &self.layout,
                shader: &self.shader,
                buffers: &buffers,
                color_format,
                blend: helpers::blend_state(material.blend()),
                cull_mode: None,
                depth_write: material.depth_write(),
                sample_count,
            },
        ));
        log::debug!("[render] {} built, blend {:?}", self.label, material.blend());
    }
}

/// Portal shimmer and fireflies, both drawn as camera-facing instanced quads.
pub(crate) struct PointsPass {
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    portal_pipeline: SpritePipeline,
    firefly_pipeline: SpritePipeline,
    portal_uniforms: wgpu::Buffer,
    portal_bg: wgpu::BindGroup,
    firefly_uniforms: wgpu::Buffer,
    firefly_bg: wgpu::BindGroup,
    portal: InstanceBuffer,
    fireflies: InstanceBuffer,
}

impl PointsPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        camera_bgl: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let portal_bgl = helpers::uniform_layout(device, "portal_points_bgl");
        let (portal_uniforms, portal_bg) = helpers::uniform_binding(
            device,
            "portal_points_uniforms",
            &portal_bgl,
            &PointsGpu::zeroed(),
        );
        let portal_pipeline = SpritePipeline::new(
            device,
            "portal_points_pipeline",
            POINTS_WGSL,
            &[camera_bgl, &portal_bgl],
            &PORTAL_ATTRIBUTES,
        );

        let firefly_bgl = helpers::uniform_layout(device, "fireflies_bgl");
        let (firefly_uniforms, firefly_bg) = helpers::uniform_binding(
            device,
            "fireflies_uniforms",
            &firefly_bgl,
            &FireflyGpu::zeroed(),
        );
        let firefly_pipeline = SpritePipeline::new(
            device,
            "fireflies_pipeline",
            FIREFLIES_WGSL,
            &[camera_bgl, &firefly_bgl],
            &FIREFLY_ATTRIBUTES,
        );

        Self {
            color_format,
            sample_count,
            portal_pipeline,
            firefly_pipeline,
            portal_uniforms,
            portal_bg,
            firefly_uniforms,
            firefly_bg,
            portal: InstanceBuffer::default(),
            fireflies: InstanceBuffer::default(),
        }
    }

    pub(crate) fn sync(&mut self, device: &wgpu::Device, scene: &PortalScene) {
        let materials = scene.materials();
        self.portal_pipeline.ensure(
            device,
            materials.get(MaterialId::PortalPoints),
            self.color_format,
            self.sample_count,
        );
        self.firefly_pipeline.ensure(
            device,
            materials.get(MaterialId::Fireflies),
            self.color_format,
            self.sample_count,
        );
        let portal_cloud = scene.portal_points().and_then(|n| n.geometry.as_points());
        self.portal.sync(device, "portal_instances", portal_cloud);
        self.fireflies.sync(device, "firefly_instances", scene.fireflies());
    }

    pub(crate) fn write_uniforms(&self, queue: &wgpu::Queue, scene: &PortalScene) {
        if let Some(node) = scene.portal_points() {
            let u = PointsGpu::new(scene.points_material(), node.transform.matrix());
            queue.write_buffer(&self.portal_uniforms, 0, bytemuck::bytes_of(&u));
        }
        let f = FireflyGpu::from(scene.firefly_uniforms());
        queue.write_buffer(&self.firefly_uniforms, 0, bytemuck::bytes_of(&f));
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, camera_bg: &wgpu::BindGroup) {
        rpass.set_bind_group(0, camera_bg, &[]);

        if let Some(pipeline) = &self.portal_pipeline.pipeline {
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, &self.portal_bg, &[]);
            self.portal.draw(rpass);
        }
        if let Some(pipeline) = &self.firefly_pipeline.pipeline {
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, &self.firefly_bg, &[]);
            self.fireflies.draw(rpass);
        }
    }
}
