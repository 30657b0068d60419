//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, creates the device against the
//! window surface, and drives the application's setup and frame callbacks.

mod runtime;

pub use runtime::{RedrawMode, Runtime, RuntimeConfig};
