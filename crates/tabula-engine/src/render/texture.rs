use std::fmt;

use crate::device::GlBackend;
use crate::error::RenderError;

use super::Engine;

/// Byte layout of host pixel data.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelFormat {
    /// 4 bytes per pixel, straight alpha.
    Rgba,
    /// 3 bytes per pixel, opaque.
    Rgb,
    /// 1 byte per pixel. Used as coverage by the mask primitive.
    Single,
}

impl PixelFormat {
    /// Maps a channel count to a format. Only 1, 3 and 4 are supported.
    pub fn from_channels(channels: usize) -> Result<Self, RenderError> {
        match channels {
            4 => Ok(PixelFormat::Rgba),
            3 => Ok(PixelFormat::Rgb),
            1 => Ok(PixelFormat::Single),
            channels => {
                log::error!("unsupported texture format: {channels} channels");
                Err(RenderError::UnsupportedFormat { channels })
            }
        }
    }

    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Rgba => 4,
            PixelFormat::Rgb => 3,
            PixelFormat::Single => 1,
        }
    }

    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba)
    }

    /// Row alignment for tightly packed rows of this format.
    ///
    /// GL accepts only 1, 2, 4 or 8. Rows of 3-byte or 1-byte pixels are only
    /// 4-byte aligned when the width happens to cooperate, so both use 1.
    #[inline]
    pub const fn unpack_alignment(self) -> i32 {
        match self {
            PixelFormat::Rgba => 4,
            PixelFormat::Rgb | PixelFormat::Single => 1,
        }
    }

    /// Size of a tightly packed `width x height` image.
    #[inline]
    pub const fn buffer_len(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.channels()
    }
}

/// A GPU texture plus what the draw path needs to know about it.
///
/// `flipped` is set on textures produced by [`Engine::finish_canvas`]: their
/// rows are stored bottom-up, so hosts pass `flip = true` to
/// [`Viewport::to_clip_space`](crate::coords::Viewport::to_clip_space) when
/// drawing them.
pub struct Texture<G: GlBackend> {
    pub(super) raw: G::Texture,
    pub(super) format: PixelFormat,
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) has_alpha: bool,
    pub(super) flipped: bool,
}

impl<G: GlBackend> fmt::Debug for Texture<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("raw", &self.raw)
            .field("format", &self.format)
            .field("size", &(self.width, self.height))
            .field("has_alpha", &self.has_alpha)
            .field("flipped", &self.flipped)
            .finish()
    }
}

impl<G: GlBackend> Texture<G> {
    #[inline]
    pub fn raw(&self) -> G::Texture {
        self.raw
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether drawing this texture may need blending.
    #[inline]
    pub fn has_transparency(&self) -> bool {
        self.has_alpha
    }

    /// Declares an RGBA texture's content fully opaque, so drawing it at full
    /// alpha skips blending.
    #[inline]
    pub fn mark_opaque(&mut self) {
        self.has_alpha = false;
    }

    #[inline]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }
}

impl<G: GlBackend> Engine<G> {
    /// Creates a 2D texture, optionally uploading tightly packed `pixels`.
    ///
    /// Filtering is nearest, wrapping is repeat. Without `pixels` the content
    /// is undefined until rendered to.
    pub fn create_texture(
        &self,
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    ) -> Result<Texture<G>, RenderError> {
        let max = self.max_texture_size;
        if width == 0 || height == 0 || width > max || height > max {
            log::error!("invalid texture size {width}x{height} (max {max})");
            return Err(RenderError::InvalidTextureSize { width, height, max });
        }
        if let Some(pixels) = pixels {
            let expected = format.buffer_len(width, height);
            if pixels.len() != expected {
                log::error!(
                    "{format:?} pixel buffer for {width}x{height} texture has {} bytes, expected {expected}",
                    pixels.len()
                );
                return Err(RenderError::PixelBufferSize { expected, actual: pixels.len() });
            }
        }

        let gl = &self.gl;
        let raw = gl.create_texture().map_err(|reason| {
            log::error!("unable to create texture: {reason}");
            RenderError::ObjectCreation { what: "texture", reason }
        })?;

        gl.bind_texture(glow::TEXTURE_2D, Some(raw));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);

        if pixels.is_some() {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, format.unpack_alignment());
        }
        let texel = self.caps.texel_format(format);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            texel.internal,
            width as i32,
            height as i32,
            texel.format,
            glow::UNSIGNED_BYTE,
            pixels,
        );
        self.check("create_texture");

        log::trace!("created {format:?} texture {raw:?} ({width}x{height})");
        Ok(Texture {
            raw,
            format,
            width,
            height,
            has_alpha: format.has_alpha(),
            flipped: false,
        })
    }

    pub fn delete_texture(&self, texture: Texture<G>) {
        self.gl.delete_texture(texture.raw);
    }
}
