//! Draw primitives.
//!
//! Each primitive is an `Engine` method drawing the shared unit quad with one
//! of the built-in programs. Primitives set the state they need and leave
//! blending off.

mod common;

mod image;
mod mask;
mod rect;

pub(crate) use common::QuadGeometry;
