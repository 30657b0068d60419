use crate::device::{DeviceContext, HostSurface};

/// Per-frame context passed to `core::App::on_frame`.
///
/// The device is shared read-only; the surface is borrowed exclusively for
/// the duration of the frame.
pub struct FrameCtx<'a> {
    pub device: &'a DeviceContext,
    pub surface: &'a mut dyn HostSurface,
}
