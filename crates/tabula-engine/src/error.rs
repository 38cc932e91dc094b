use thiserror::Error;

use crate::render::FramebufferStatus;
use crate::shader::{ProgramKind, ShaderStage, SlotKind};

/// Failures reported by the engine.
///
/// Every variant aborts only the operation that produced it. Objects created by
/// that operation are released before the error is returned.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to compile {stage} shader: {log}")]
    Compile {
        stage: ShaderStage,
        source_text: String,
        log: String,
    },

    #[error("failed to link {program} program: {log}")]
    Link { program: ProgramKind, log: String },

    #[error("{kind} `{name}` not found in {program} program")]
    MissingSlot {
        program: ProgramKind,
        name: &'static str,
        kind: SlotKind,
    },

    #[error("backend could not create {what}: {reason}")]
    ObjectCreation { what: &'static str, reason: String },

    #[error("unsupported texture format ({channels} channels)")]
    UnsupportedFormat { channels: usize },

    #[error("invalid texture size {width}x{height} (max {max})")]
    InvalidTextureSize { width: u32, height: u32, max: u32 },

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    PixelBufferSize { expected: usize, actual: usize },

    #[error("unable to create canvas: {0}")]
    IncompleteFramebuffer(FramebufferStatus),

    #[error("mask program is not available on this engine")]
    MaskUnavailable,
}

impl RenderError {
    /// True for errors raised while bringing up shader programs.
    ///
    /// These make the engine instance unusable; all other errors are local to
    /// the failing call.
    pub fn is_init_failure(&self) -> bool {
        matches!(
            self,
            RenderError::Compile { .. } | RenderError::Link { .. } | RenderError::MissingSlot { .. }
        )
    }
}
