//! Baked texture uploads. Both slots start as 1x1 placeholders and are
//! replaced when the decoded images arrive from the loader.

use portal_core::{ColorSpace, TextureImage, TextureOptions, TextureSlot};
use wgpu;

/// Decoded images waiting for the next frame to upload them.
#[derive(Default)]
pub struct PendingTextures {
    images: Vec<(TextureSlot, TextureImage)>,
}

impl PendingTextures {
    pub fn push(&mut self, slot: TextureSlot, image: TextureImage) {
        self.images.retain(|(s, _)| *s != slot);
        self.images.push((slot, image));
    }

    pub fn take(&mut self) -> Vec<(TextureSlot, TextureImage)> {
        std::mem::take(&mut self.images)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

pub(crate) struct SceneTextures {
    baked: wgpu::TextureView,
    light_map: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl SceneTextures {
    pub(crate) fn placeholders(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // mid grey until the baked map arrives; black light map adds nothing
        let baked = upload(
            device,
            queue,
            "baked_placeholder",
            &TextureImage::solid([128, 128, 128, 255], TextureOptions::BAKED),
        );
        let light_map = upload(
            device,
            queue,
            "light_map_placeholder",
            &TextureImage::solid([0, 0, 0, 255], TextureOptions::BAKED),
        );
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("baked_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            baked,
            light_map,
            sampler,
        }
    }

    pub(crate) fn view(&self, slot: TextureSlot) -> &wgpu::TextureView {
        match slot {
            TextureSlot::Baked => &self.baked,
            TextureSlot::LightMap => &self.light_map,
        }
    }

    pub(crate) fn replace(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: TextureSlot,
        image: &TextureImage,
    ) {
        match slot {
            TextureSlot::Baked => self.baked = upload(device, queue, "baked_texture", image),
            TextureSlot::LightMap => self.light_map = upload(device, queue, "light_map_texture", image),
        }
        log::info!("[render] uploaded {:?} {}x{}", slot, image.width, image.height);
    }
}

fn format_for(options: TextureOptions) -> wgpu::TextureFormat {
    match options.color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TextureImage,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: image.width.max(1),
        height: image.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: format_for(image.options),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
