//! GPU device + host surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue once per process
//! - the `HostSurface` seam that supplies drawables to the frame renderer
//! - window-backed and offscreen surface implementations

mod context;
mod init;
mod offscreen;
mod surface;
mod window_surface;

pub use context::DeviceContext;
pub use init::GpuInit;
pub use offscreen::OffscreenSurface;
pub use surface::{Drawable, HostSurface, OutputFormat, RenderTargetDescriptor};
pub use window_surface::WindowSurface;
