use crate::device::{DeviceContext, Drawable, HostSurface, RenderTargetDescriptor};
use crate::error::{RenderError, Result};
use crate::geometry::GpuMesh;
use crate::pipeline::PipelineState;

/// What one frame draws: a pipeline state and a mesh built against its layout.
#[derive(Copy, Clone)]
pub struct DrawCall<'a> {
    pub pipeline: &'a PipelineState,
    pub mesh: &'a GpuMesh,
}

/// Result of [`FrameRenderer::render_frame`].
#[derive(Debug)]
pub enum FrameOutcome {
    Presented(PresentedFrame),
    /// The frame was dropped before submission; the error says why.
    Skipped(RenderError),
}

/// A frame that reached the host for presentation.
#[derive(Debug, Clone)]
pub struct PresentedFrame {
    /// Zero-based, in submission order. Skipped frames take no index.
    pub frame_index: u64,
    pub submission: wgpu::SubmissionIndex,
}

/// Drives the per-frame sequence. Holds no GPU objects itself; only the
/// frame counter survives between frames.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    frames_presented: u64,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames submitted and presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Idle → BatchOpen: starts a new command batch.
    pub fn begin<'f>(&'f mut self, ctx: &'f DeviceContext) -> Result<OpenBatch<'f>> {
        if ctx.is_lost() {
            return Err(RenderError::QueueExhausted("device lost".into()));
        }

        let encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame batch"),
            });

        Ok(OpenBatch {
            renderer: self,
            ctx,
            encoder,
        })
    }

    /// Runs one full frame: begin, acquire, draw, submit, present.
    ///
    /// Per-frame failures come back as [`FrameOutcome::Skipped`]; anything
    /// else is returned as an error.
    pub fn render_frame(
        &mut self,
        ctx: &DeviceContext,
        surface: &mut dyn HostSurface,
        call: DrawCall<'_>,
    ) -> Result<FrameOutcome> {
        let attempt = self
            .begin(ctx)
            .and_then(|batch| batch.acquire(surface))
            .map(|frame| frame.draw(call).submit());

        match attempt {
            Ok(submitted) => Ok(FrameOutcome::Presented(submitted.present(surface))),
            Err(err) if err.is_frame_skip() => {
                log::debug!("frame skipped: {err}");
                Ok(FrameOutcome::Skipped(err))
            }
            Err(err) => Err(err),
        }
    }
}

/// BatchOpen: an encoder exists, no drawable yet.
pub struct OpenBatch<'f> {
    renderer: &'f mut FrameRenderer,
    ctx: &'f DeviceContext,
    encoder: wgpu::CommandEncoder,
}

impl<'f> OpenBatch<'f> {
    /// BatchOpen → Recording: obtains the render target and next drawable.
    ///
    /// On `NoDrawableAvailable` the batch is dropped unsubmitted.
    pub fn acquire(self, surface: &mut dyn HostSurface) -> Result<RecordingFrame<'f>> {
        let target = surface
            .current_render_target()
            .ok_or(RenderError::NoDrawableAvailable)?;
        let drawable = surface
            .current_drawable()
            .ok_or(RenderError::NoDrawableAvailable)?;

        Ok(RecordingFrame {
            renderer: self.renderer,
            ctx: self.ctx,
            encoder: self.encoder,
            drawable,
            target,
        })
    }
}

/// Recording: encoder + drawable, ready for the frame's draw.
pub struct RecordingFrame<'f> {
    renderer: &'f mut FrameRenderer,
    ctx: &'f DeviceContext,
    encoder: wgpu::CommandEncoder,
    drawable: Drawable,
    target: RenderTargetDescriptor,
}

impl<'f> RecordingFrame<'f> {
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    /// Recording → Closed: records the pass and finishes the encoder.
    ///
    /// Order within the pass: pipeline, vertex buffer (at the layout's
    /// buffer index and any padding slots below it), index buffer, then one
    /// indexed draw.
    pub fn draw(mut self, call: DrawCall<'_>) -> ClosedBatch<'f> {
        {
            let mut pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.drawable.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.target.clear_color.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mesh = call.mesh;
            pass.set_pipeline(call.pipeline.raw());
            // The mesh sits at the layout's slot; padding slots below it get
            // the same buffer and read nothing from it.
            for slot in call.pipeline.vertex_slots() {
                pass.set_vertex_buffer(slot, mesh.vertex_buffer().slice(..));
            }
            pass.set_index_buffer(mesh.index_buffer().slice(..), mesh.index_format());
            pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
        }

        ClosedBatch {
            renderer: self.renderer,
            ctx: self.ctx,
            commands: self.encoder.finish(),
            drawable: self.drawable,
        }
    }
}

/// Closed: the command buffer is final and awaits submission.
pub struct ClosedBatch<'f> {
    renderer: &'f mut FrameRenderer,
    ctx: &'f DeviceContext,
    commands: wgpu::CommandBuffer,
    drawable: Drawable,
}

impl<'f> ClosedBatch<'f> {
    /// Closed → Submitted: hands the batch to the queue without waiting for
    /// the GPU. Batches on the queue execute in submission order.
    pub fn submit(self) -> SubmittedFrame {
        let submission = self.ctx.queue().submit(std::iter::once(self.commands));

        let frame_index = self.renderer.frames_presented;
        self.renderer.frames_presented += 1;

        SubmittedFrame {
            frame_index,
            submission,
            drawable: self.drawable,
        }
    }
}

/// Submitted: GPU work is queued; the drawable still needs presenting.
#[must_use = "a submitted frame must be presented or it is visually dropped"]
pub struct SubmittedFrame {
    frame_index: u64,
    submission: wgpu::SubmissionIndex,
    drawable: Drawable,
}

impl SubmittedFrame {
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Submitted → Presented.
    pub fn present(self, surface: &mut dyn HostSurface) -> PresentedFrame {
        surface.present(self.drawable);
        PresentedFrame {
            frame_index: self.frame_index,
            submission: self.submission,
        }
    }
}
