//! Coordinate types shared by the engine and its host.
//!
//! Draw primitives take transforms that map the unit quad `(0, 0)..(1, 1)`
//! directly into clip space. Host code usually works in pixels and converts
//! with [`Viewport::to_clip_space`].

mod transform;
mod viewport;

pub use transform::Transform;
pub use viewport::Viewport;
