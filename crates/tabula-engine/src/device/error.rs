use std::fmt;

use super::GlBackend;

/// Error flag reported by `glGetError`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GlError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    OutOfMemory,
    InvalidFramebufferOperation,
    Unknown(u32),
}

impl GlError {
    /// Maps a raw error code; `NO_ERROR` yields `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            glow::NO_ERROR => None,
            glow::INVALID_ENUM => Some(GlError::InvalidEnum),
            glow::INVALID_VALUE => Some(GlError::InvalidValue),
            glow::INVALID_OPERATION => Some(GlError::InvalidOperation),
            glow::OUT_OF_MEMORY => Some(GlError::OutOfMemory),
            glow::INVALID_FRAMEBUFFER_OPERATION => Some(GlError::InvalidFramebufferOperation),
            other => Some(GlError::Unknown(other)),
        }
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlError::InvalidEnum => f.write_str("GL_INVALID_ENUM"),
            GlError::InvalidValue => f.write_str("GL_INVALID_VALUE"),
            GlError::InvalidOperation => f.write_str("GL_INVALID_OPERATION"),
            GlError::OutOfMemory => f.write_str("GL_OUT_OF_MEMORY"),
            GlError::InvalidFramebufferOperation => f.write_str("GL_INVALID_FRAMEBUFFER_OPERATION"),
            GlError::Unknown(code) => write!(f, "unknown GL error 0x{code:04x}"),
        }
    }
}

/// Drains the backend error flag and logs it against `last_call`.
///
/// Returns the first error seen so tests can observe it; callers in the engine
/// ignore the result.
pub fn check_gl_error<G: GlBackend>(gl: &G, last_call: &str) -> Option<GlError> {
    let first = GlError::from_code(gl.get_error())?;
    log::warn!("OpenGL error during call to {last_call}: {first}");

    // GL may queue several flags; drain them so the next check starts clean.
    // Bounded because a lost context can report errors forever.
    for _ in 0..8 {
        match GlError::from_code(gl.get_error()) {
            Some(more) => log::warn!("  followed by {more}"),
            None => break,
        }
    }
    Some(first)
}
