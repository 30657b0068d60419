use anyhow::{Context, Result};

use crate::device::{DeviceContext, GpuInit, OffscreenSurface};
use crate::frame::{FrameOutcome, PresentedFrame};
use crate::paint::Color;

use super::{MeshScene, SceneConfig, SetupStage};

/// Texture format of headless render targets.
pub const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Sets the scene up on a headless device and renders exactly one frame
/// into a `width` x `height` offscreen target.
pub fn render_once(
    config: SceneConfig,
    gpu_init: &GpuInit,
    width: u32,
    height: u32,
    clear_color: Color,
) -> Result<PresentedFrame> {
    let ctx = DeviceContext::headless(gpu_init).context(SetupStage::Device)?;
    let mut surface = OffscreenSurface::new(&ctx, width, height, HEADLESS_FORMAT, clear_color);

    let mut scene = MeshScene::new(config);
    scene.load(&ctx, &surface)?;

    match scene.draw(&ctx, &mut surface)? {
        FrameOutcome::Presented(frame) => Ok(frame),
        FrameOutcome::Skipped(err) => Err(anyhow::Error::new(err).context("headless frame was skipped")),
    }
}
