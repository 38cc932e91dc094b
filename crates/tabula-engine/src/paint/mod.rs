//! Paint model shared between host and draw primitives.
//!
//! Scope: flat colors. Textures live in `render`.

pub mod color;

pub use color::Color;
