//! GPU rendering subsystem.
//!
//! The `Engine` owns the shared quad and the linked programs. Textures,
//! canvases and draw primitives are all reached through it.
//!
//! Convention:
//! - Draw transforms map the unit quad `(0, 0)..(1, 1)` to clip space.
//! - Texture rows are uploaded top row first.

mod canvas;
mod ctx;
mod shapes;
mod texture;

pub use canvas::{Canvas, FramebufferStatus};
pub use ctx::Engine;
pub use texture::{PixelFormat, Texture};
