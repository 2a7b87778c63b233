use crate::constants::MSAA_SAMPLES;
use portal_core::{CameraUniforms, Color, PerspectiveCamera, PortalScene};
use web_sys as web;

mod helpers;
mod meshes;
mod points;
mod targets;
mod textures;
use meshes::MeshPass;
use points::PointsPass;
use targets::RenderTargets;
use textures::SceneTextures;

pub use textures::PendingTextures;

// ===================== WebGPU state =====================

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,

    camera_buffer: wgpu::Buffer,
    camera_bg: wgpu::BindGroup,
    textures: SceneTextures,
    meshes: MeshPass,
    points: PointsPass,

    width: u32,
    height: u32,
    pixel_ratio: f32,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        canvas: &'a web::HtmlCanvasElement,
        pixel_ratio: f32,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, format, width, height, MSAA_SAMPLES);

        let camera_bgl = helpers::uniform_layout(&device, "camera_bgl");
        let (camera_buffer, camera_bg) = helpers::uniform_binding(
            &device,
            "camera_uniforms",
            &camera_bgl,
            &CameraUniforms {
                view: [[0.0; 4]; 4],
                proj: [[0.0; 4]; 4],
                resolution: [width as f32, height as f32],
                pixel_ratio,
                _pad: 0.0,
            },
        );

        let textures = SceneTextures::placeholders(&device, &queue);
        let meshes = MeshPass::new(&device, &camera_bgl, format, MSAA_SAMPLES);
        let points = PointsPass::new(&device, &camera_bgl, format, MSAA_SAMPLES);
        log::info!("[render] WebGPU ready: {:?} {}x{}", format, width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            camera_buffer,
            camera_bg,
            textures,
            meshes,
            points,
            width,
            height,
            pixel_ratio,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.reconfigure();
        }
    }

    /// Reconfigure the surface at the current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.config.width = self.width;
        self.config.height = self.height;
        self.surface.configure(&self.device, &self.config);
        self.targets
            .recreate(&self.device, self.config.format, self.width, self.height);
    }

    /// Upload any decoded textures that arrived since the last frame.
    pub fn upload_textures(&mut self, pending: &mut PendingTextures) {
        if pending.is_empty() {
            return;
        }
        for (slot, image) in pending.take() {
            self.textures.replace(&self.device, &self.queue, slot, &image);
        }
        self.meshes.rebind_textures(&self.device, &self.textures);
    }

    pub fn render(
        &mut self,
        scene: &PortalScene,
        camera: &PerspectiveCamera,
    ) -> Result<(), wgpu::SurfaceError> {
        self.meshes.sync(&self.device, scene, &self.textures);
        self.points.sync(&self.device, scene);

        let cam = CameraUniforms::new(camera, self.width, self.height, self.pixel_ratio);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&cam));
        self.meshes.write_uniforms(&self.queue, scene);
        self.points.write_uniforms(&self.queue, scene);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let (color_view, resolve_target) = self.targets.color_attachment(&view);
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.clear_color())),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            // opaque meshes, then blended bulbs, then sprites
            self.meshes.draw(&mut rpass, &self.camera_bg);
            self.points.draw(&mut rpass, &self.camera_bg);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn clear_color(color: Color) -> wgpu::Color {
    let [r, g, b, a] = portal_core::linear_rgba(color, 1.0);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}
