//! Pipeline state.
//!
//! A [`PipelineState`] binds a compiled program, the output pixel format and
//! the vertex layout into one immutable render pipeline. Building it is the
//! most expensive one-time step, so it happens after shader compilation and
//! before the first frame, and is never rebuilt per frame.

mod state;
mod validate;

pub use state::{FillMode, PipelineOptions, PipelineState};
pub use validate::validate;
