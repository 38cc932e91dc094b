use crate::render::PixelFormat;

use super::sources::ShaderSet;

/// GLSL dialect / GL profile the host context speaks.
///
/// This is a fixed capability of the build target (or of the context the host
/// chose to create). It is resolved once into [`Capabilities`] at init; draw
/// code never branches on it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Dialect {
    /// OpenGL ES 2.0 / GLSL ES 1.00: `attribute`/`varying`, `texture2D`,
    /// `gl_FragColor`, unsized `LUMINANCE` for single-channel textures.
    Gles2,
    /// OpenGL 3.2 core / GLSL 1.50: `in`/`out`, `texture`, declared fragment
    /// output, mandatory vertex array object, `RED` single-channel textures.
    Glsl150,
}

impl Dialect {
    /// Default dialect for the current build target.
    ///
    /// macOS only offers core profiles; every other supported target runs
    /// against a GLES 2 compatible context.
    pub const fn native() -> Self {
        if cfg!(target_os = "macos") {
            Dialect::Glsl150
        } else {
            Dialect::Gles2
        }
    }
}

/// Upload format for one [`PixelFormat`]: (internal format, format).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TexelFormat {
    pub internal: i32,
    pub format: u32,
}

/// Everything derived from a [`Dialect`], computed once at init.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub dialect: Dialect,
    pub shaders: ShaderSet,
    /// Core profiles refuse to draw without a bound vertex array.
    pub needs_vertex_array: bool,
    /// Core profiles require selecting the color attachment as draw buffer.
    pub selects_draw_buffer: bool,
    /// Query used to capture the currently bound render target.
    pub framebuffer_binding: u32,
    rgba: TexelFormat,
    rgb: TexelFormat,
    single: TexelFormat,
}

// `LUMINANCE` is absent from core profile headers.
const LUMINANCE: u32 = 0x1909;

impl Capabilities {
    pub fn resolve(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Gles2 => Self {
                dialect,
                shaders: ShaderSet::for_dialect(dialect),
                needs_vertex_array: false,
                selects_draw_buffer: false,
                framebuffer_binding: glow::FRAMEBUFFER_BINDING,
                rgba: TexelFormat { internal: glow::RGBA as i32, format: glow::RGBA },
                rgb: TexelFormat { internal: glow::RGB as i32, format: glow::RGB },
                single: TexelFormat { internal: LUMINANCE as i32, format: LUMINANCE },
            },
            Dialect::Glsl150 => Self {
                dialect,
                shaders: ShaderSet::for_dialect(dialect),
                needs_vertex_array: true,
                selects_draw_buffer: true,
                framebuffer_binding: glow::DRAW_FRAMEBUFFER_BINDING,
                rgba: TexelFormat { internal: glow::RGBA8 as i32, format: glow::RGBA },
                rgb: TexelFormat { internal: glow::RGB8 as i32, format: glow::RGB },
                single: TexelFormat { internal: glow::R8 as i32, format: glow::RED },
            },
        }
    }

    #[inline]
    pub fn texel_format(&self, format: PixelFormat) -> TexelFormat {
        match format {
            PixelFormat::Rgba => self.rgba,
            PixelFormat::Rgb => self.rgb,
            PixelFormat::Single => self.single,
        }
    }
}
