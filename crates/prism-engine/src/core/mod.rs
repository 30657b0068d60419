//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the
//! application: one-time setup, then one callback per host-driven frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
