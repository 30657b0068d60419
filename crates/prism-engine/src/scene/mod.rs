//! Scene orchestration.
//!
//! Runs the dependency-ordered setup (device, shaders, pipeline state, mesh)
//! once and then draws the loaded mesh each frame. [`MeshScene`] plugs into
//! the window runtime as a [`crate::core::App`]; [`render_once`] does the
//! same against an offscreen surface.

mod config;
mod headless;
mod mesh_scene;

pub use config::{MeshSource, SceneConfig, SetupStage};
pub use headless::{render_once, HEADLESS_FORMAT};
pub use mesh_scene::MeshScene;
