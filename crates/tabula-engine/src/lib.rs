//! Tabula engine crate.
//!
//! A small OpenGL 2D renderer: three draw primitives (image, flat rect,
//! two-color mask) over one shared unit quad, plus nestable offscreen
//! canvases. The host creates the GL context and makes it current; the engine
//! never does.

pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod paint;
pub mod render;
pub mod shader;

pub use coords::{Transform, Viewport};
pub use device::{EngineConfig, GlBackend, GlowBackend};
pub use error::RenderError;
pub use paint::Color;
pub use render::{Canvas, Engine, PixelFormat, Texture};
pub use shader::Dialect;
