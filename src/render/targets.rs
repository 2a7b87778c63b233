use super::helpers;
use wgpu;

/// Attachments of the scene pass that track the surface size.
///
/// - `depth_*` is the shared depth buffer (multisampled with the color).
/// - `msaa_*` is the multisampled color target resolved into the swapchain
///   image; absent when the pass renders single-sampled.
pub(crate) struct RenderTargets {
    pub(crate) depth_tex: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
    pub(crate) msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
    pub(crate) sample_count: u32,
}

impl RenderTargets {
    pub(crate) fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        let (depth_tex, depth_view) = helpers::create_render_texture(
            device,
            "depth_tex",
            width,
            height,
            helpers::DEPTH_FORMAT,
            sample_count,
        );
        let msaa = (sample_count > 1).then(|| {
            helpers::create_render_texture(device, "msaa_color", width, height, color_format, sample_count)
        });
        Self {
            depth_tex,
            depth_view,
            msaa,
            sample_count,
        }
    }

    pub(crate) fn recreate(
        &mut self,
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) {
        *self = Self::new(device, color_format, width, height, self.sample_count);
    }

    /// (render target, resolve target) for the given swapchain view.
    pub(crate) fn color_attachment<'v>(
        &'v self,
        surface_view: &'v wgpu::TextureView,
    ) -> (&'v wgpu::TextureView, Option<&'v wgpu::TextureView>) {
        match &self.msaa {
            Some((_, msaa_view)) => (msaa_view, Some(surface_view)),
            None => (surface_view, None),
        }
    }
}
