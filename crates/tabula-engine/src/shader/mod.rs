//! Shader program linker.
//!
//! Sources are generated once per [`Dialect`]; programs are linked and their
//! attribute/uniform slots resolved from explicit per-program tables.

mod dialect;
mod program;
mod sources;

pub use dialect::{Capabilities, Dialect, TexelFormat};
pub use program::{
    link_program, ProgramKind, Semantic, ShaderProgram, ShaderStage, Slot, SlotKind,
};
pub use sources::{ShaderPair, ShaderSet};
