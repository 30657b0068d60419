use crate::paint::Color;

/// Host display surface contract.
///
/// The host hands out one drawable per frame. Both accessors may transiently
/// return `None` (minimized window, swapchain timeout, ...); the frame renderer
/// treats that as "skip this frame", never as fatal.
pub trait HostSurface {
    /// Pixel format of the drawables this surface produces.
    fn format(&self) -> wgpu::TextureFormat;

    /// Acquires the next presentable image.
    fn current_drawable(&mut self) -> Option<Drawable>;

    /// Describes how the frame's render pass targets the drawable.
    fn current_render_target(&self) -> Option<RenderTargetDescriptor>;

    /// Presents a drawable whose commands have been submitted.
    fn present(&mut self, drawable: Drawable) {
        drawable.present();
    }
}

/// Render pass setup for the frame's color attachment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderTargetDescriptor {
    pub clear_color: Color,
}

/// Pipeline output format, obtainable only by querying a surface.
///
/// Pipeline states take this instead of a raw `wgpu::TextureFormat`, so the
/// format a pipeline renders to is always the one the surface reports.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OutputFormat(wgpu::TextureFormat);

impl OutputFormat {
    /// Returns the surface's current drawable format.
    pub fn of<S: HostSurface + ?Sized>(surface: &S) -> Self {
        Self(surface.format())
    }

    #[inline]
    pub fn get(self) -> wgpu::TextureFormat {
        self.0
    }
}

enum DrawableTexture {
    Surface(wgpu::SurfaceTexture),
    Offscreen,
}

/// A single acquired presentable image.
///
/// Short-lived: owned by exactly one frame. Holding a swapchain drawable
/// prevents acquisition of subsequent frames.
pub struct Drawable {
    // Declared before `texture` so the view is released first.
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: (u32, u32),
    texture: DrawableTexture,
}

impl Drawable {
    pub(crate) fn from_surface(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let format = surface_texture.texture.format();
        let size = (surface_texture.texture.width(), surface_texture.texture.height());

        Self {
            view,
            format,
            size,
            texture: DrawableTexture::Surface(surface_texture),
        }
    }

    pub(crate) fn from_texture(texture: &wgpu::Texture) -> Self {
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            format: texture.format(),
            size: (texture.width(), texture.height()),
            texture: DrawableTexture::Offscreen,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Schedules the image for presentation. Offscreen drawables are kept by
    /// their surface and need no presentation.
    pub fn present(self) {
        let Self { view, texture, .. } = self;
        drop(view);
        if let DrawableTexture::Surface(surface_texture) = texture {
            surface_texture.present();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFormat(wgpu::TextureFormat);

    impl HostSurface for FixedFormat {
        fn format(&self) -> wgpu::TextureFormat {
            self.0
        }

        fn current_drawable(&mut self) -> Option<Drawable> {
            None
        }

        fn current_render_target(&self) -> Option<RenderTargetDescriptor> {
            None
        }
    }

    #[test]
    fn output_format_follows_the_surface() {
        let surface = FixedFormat(wgpu::TextureFormat::Rgba16Float);
        let out = OutputFormat::of(&surface);
        assert_eq!(out.get(), wgpu::TextureFormat::Rgba16Float);
        assert_ne!(out.get(), wgpu::TextureFormat::Bgra8Unorm);
    }

    #[test]
    fn output_format_through_trait_object() {
        let surface: Box<dyn HostSurface> = Box::new(FixedFormat(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(OutputFormat::of(surface.as_ref()).get(), wgpu::TextureFormat::Bgra8UnormSrgb);
    }
}
