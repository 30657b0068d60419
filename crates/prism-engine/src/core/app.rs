use winit::event::WindowEvent;

use crate::device::{DeviceContext, HostSurface};

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once, after the device and surface exist and before the first
    /// frame. An error aborts the runtime.
    fn setup(&mut self, ctx: &DeviceContext, surface: &dyn HostSurface) -> anyhow::Result<()>;

    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per host redraw. Runs to completion; nothing suspends
    /// inside a frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> anyhow::Result<AppControl>;
}
