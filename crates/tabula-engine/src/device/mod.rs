//! Graphics device access.
//!
//! This module is responsible for:
//! - the `GlBackend` seam every engine call goes through
//! - the `glow` implementation used in production
//! - engine configuration and debug-only GL error polling

mod backend;
mod error;
mod gl_context;
mod init;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::GlBackend;
pub use error::{check_gl_error, GlError};
pub use gl_context::GlowBackend;
pub use init::EngineConfig;
