//! Frame renderer.
//!
//! One frame is a typestate chain, each step consuming the previous one:
//!
//! `FrameRenderer::begin` → [`OpenBatch`] → `acquire` → [`RecordingFrame`]
//! → `draw` → [`ClosedBatch`] → `submit` → [`SubmittedFrame`] → `present`
//! → [`PresentedFrame`].
//!
//! A closed batch cannot record more commands because the encoder has been
//! consumed. Dropping any intermediate state releases its encoder and
//! drawable without submitting anything.

mod renderer;

pub use renderer::{
    ClosedBatch, DrawCall, FrameOutcome, FrameRenderer, OpenBatch, PresentedFrame, RecordingFrame,
    SubmittedFrame,
};
