//! Shader module.
//!
//! Compiles a vertex + fragment WGSL program from source text. Source is
//! parsed and validated with naga first so that missing entry points and
//! stage-signature errors surface as [`RenderError::ShaderCompileError`]
//! before anything reaches the device.
//!
//! [`RenderError::ShaderCompileError`]: crate::RenderError::ShaderCompileError

mod program;
mod reflect;

pub use program::ShaderProgram;
pub use reflect::{
    capabilities_for, reflect, reflect_with, EntryPoints, InputKind, ShaderReflection, VertexInput,
};

/// Embedded default program with entry points `vert` and `frag`.
pub const BASIC_WGSL: &str = include_str!("shaders/basic.wgsl");
