use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the engine.
///
/// Startup errors are fatal. [`RenderError::NoDrawableAvailable`] and
/// [`RenderError::QueueExhausted`] are per-frame and mean "skip this frame".
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible GPU adapter available: {0}")]
    NoGpuAvailable(String),

    #[error("failed to create device and submission queue: {0}")]
    QueueCreationFailed(String),

    #[error("failed to create presentation surface: {0}")]
    SurfaceCreationFailed(String),

    #[error("shader compilation failed:\n{diagnostics}")]
    ShaderCompileError { diagnostics: String },

    #[error("pipeline validation failed: {0}")]
    PipelineValidationError(String),

    #[error("invalid vertex layout: {0}")]
    InvalidVertexLayout(String),

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    #[error("unsupported asset format in {}: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("no drawable available from the host surface")]
    NoDrawableAvailable,

    #[error("cannot open a command batch: {0}")]
    QueueExhausted(String),
}

impl RenderError {
    /// Returns `true` for per-frame errors after which the frame is skipped.
    pub fn is_frame_skip(&self) -> bool {
        matches!(self, Self::NoDrawableAvailable | Self::QueueExhausted(_))
    }

    pub(crate) fn shader(diagnostics: impl Into<String>) -> Self {
        Self::ShaderCompileError { diagnostics: diagnostics.into() }
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_frame_errors_skip() {
        assert!(RenderError::NoDrawableAvailable.is_frame_skip());
        assert!(RenderError::QueueExhausted("device lost".into()).is_frame_skip());

        assert!(!RenderError::NoGpuAvailable("none".into()).is_frame_skip());
        assert!(!RenderError::shader("oops").is_frame_skip());
        assert!(!RenderError::AssetNotFound(PathBuf::from("train.obj")).is_frame_skip());
    }

    #[test]
    fn shader_error_keeps_diagnostics() {
        let msg = RenderError::shader("entry point `vertX` not found").to_string();
        assert!(msg.contains("vertX"));
    }
}
