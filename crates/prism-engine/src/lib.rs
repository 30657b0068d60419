//! Prism engine crate.
//!
//! This crate owns the GPU setup and single-frame submission path used by the
//! tutorial binaries: device, geometry, shaders, pipeline state and the frame
//! renderer, plus the window runtime that drives them.

pub mod error;

pub mod device;
pub mod geometry;
pub mod shader;
pub mod pipeline;
pub mod frame;

pub mod core;
pub mod window;
pub mod scene;

pub mod logging;
pub mod paint;

pub use error::{RenderError, Result};
