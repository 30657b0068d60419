use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::{RenderError, Result};
use crate::paint::Color;

use super::{DeviceContext, Drawable, GpuInit, HostSurface, RenderTargetDescriptor};

/// What a failed `get_current_texture` means for the current frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum AcquireFailure {
    /// Reconfigure the swapchain; the next frame may succeed.
    Reconfigure,
    Skip,
    /// Stop acquiring; the runtime aborts.
    Abort,
}

/// Window-backed host surface (swapchain).
///
/// The surface is created before the device so adapter selection can require
/// compatibility with it ([`WindowSurface::create_raw`]), then configured
/// against the device ([`WindowSurface::new`]).
pub struct WindowSurface {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    clear_color: Color,

    /// Set after an unrecoverable acquisition error.
    failed: bool,
}

impl WindowSurface {
    /// Creates the unconfigured wgpu surface for `window`.
    pub fn create_raw(
        instance: &wgpu::Instance,
        window: Arc<Window>,
    ) -> Result<wgpu::Surface<'static>> {
        instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceCreationFailed(e.to_string()))
    }

    /// Picks format and alpha mode from the surface capabilities and
    /// configures the swapchain.
    pub fn new(
        window: Arc<Window>,
        surface: wgpu::Surface<'static>,
        ctx: &DeviceContext,
        init: &GpuInit,
        clear_color: Color,
    ) -> Result<Self> {
        let size = window.inner_size();

        let caps = surface.get_capabilities(ctx.adapter());
        let format = choose_surface_format(&caps, init.prefer_srgb).ok_or_else(|| {
            RenderError::SurfaceCreationFailed("surface reports no supported formats".into())
        })?;
        let alpha_mode = choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(ctx.device(), &config);
        log::info!("surface configured: {format:?} {}x{}", config.width, config.height);

        Ok(Self {
            window,
            surface,
            device: ctx.device().clone(),
            config,
            size,
            clear_color,
            failed: false,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Returns `true` once acquisition hit an unrecoverable error.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that
    /// case only the stored size changes and frames are skipped until the
    /// window becomes visible again.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if !is_drawable_size(new_size) {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn handle_surface_error(&mut self, err: &wgpu::SurfaceError) -> AcquireFailure {
        let action = map_surface_error(err);
        if action == AcquireFailure::Reconfigure && is_drawable_size(self.size) {
            self.surface.configure(&self.device, &self.config);
        }
        action
    }
}

impl HostSurface for WindowSurface {
    fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn current_drawable(&mut self) -> Option<Drawable> {
        if self.failed || !is_drawable_size(self.size) {
            return None;
        }

        match self.surface.get_current_texture() {
            Ok(surface_texture) => Some(Drawable::from_surface(surface_texture)),
            Err(err) => {
                match self.handle_surface_error(&err) {
                    AcquireFailure::Abort => {
                        log::error!("surface acquisition failed: {err}");
                        self.failed = true;
                    }
                    action => log::debug!("surface acquisition: {err} ({action:?})"),
                }
                None
            }
        }
    }

    fn current_render_target(&self) -> Option<RenderTargetDescriptor> {
        is_drawable_size(self.size).then_some(RenderTargetDescriptor {
            clear_color: self.clear_color,
        })
    }

    fn present(&mut self, drawable: Drawable) {
        self.window.pre_present_notify();
        drawable.present();
    }
}

fn is_drawable_size(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}

fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

fn map_surface_error(err: &wgpu::SurfaceError) -> AcquireFailure {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => AcquireFailure::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => AcquireFailure::Abort,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => AcquireFailure::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: &[wgpu::TextureFormat], alpha: &[wgpu::CompositeAlphaMode]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            alpha_modes: alpha.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn srgb_format_is_preferred() {
        let c = caps(
            &[wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb],
            &[],
        );
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn first_format_when_no_srgb_offered() {
        let c = caps(&[wgpu::TextureFormat::Rgba16Float, wgpu::TextureFormat::Bgra8Unorm], &[]);
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Rgba16Float));
    }

    #[test]
    fn no_formats_yields_none() {
        assert_eq!(choose_surface_format(&caps(&[], &[]), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back_to_first() {
        let c = caps(&[], &[wgpu::CompositeAlphaMode::Opaque]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(choose_alpha_mode(&caps(&[], &[]), None), wgpu::CompositeAlphaMode::Auto);
    }

    #[test]
    fn surface_errors_map_to_actions() {
        assert_eq!(map_surface_error(&wgpu::SurfaceError::Outdated), AcquireFailure::Reconfigure);
        assert_eq!(map_surface_error(&wgpu::SurfaceError::Timeout), AcquireFailure::Skip);
        assert_eq!(map_surface_error(&wgpu::SurfaceError::OutOfMemory), AcquireFailure::Abort);
    }
}
