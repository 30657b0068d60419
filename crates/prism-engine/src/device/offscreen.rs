use crate::paint::Color;

use super::{DeviceContext, Drawable, HostSurface, RenderTargetDescriptor};

/// Host surface backed by a single render-attachment texture.
///
/// Used for headless runs: every frame draws into the same texture, so there
/// is no swapchain and presentation is a no-op.
pub struct OffscreenSurface {
    texture: wgpu::Texture,
    clear_color: Color,
}

impl OffscreenSurface {
    pub fn new(
        ctx: &DeviceContext,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        clear_color: Color,
    ) -> Self {
        let texture = ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("prism offscreen target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Self { texture, clear_color }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

impl HostSurface for OffscreenSurface {
    fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    fn current_drawable(&mut self) -> Option<Drawable> {
        Some(Drawable::from_texture(&self.texture))
    }

    fn current_render_target(&self) -> Option<RenderTargetDescriptor> {
        Some(RenderTargetDescriptor {
            clear_color: self.clear_color,
        })
    }
}
