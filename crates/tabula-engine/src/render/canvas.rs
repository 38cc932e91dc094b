use std::fmt;

use crate::coords::Viewport;
use crate::device::GlBackend;
use crate::error::RenderError;

use super::{Engine, PixelFormat, Texture};

/// Why a framebuffer was not complete.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FramebufferStatus {
    Undefined,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDimensions,
    IncompleteDrawBuffer,
    IncompleteReadBuffer,
    Unsupported,
    IncompleteMultisample,
    IncompleteLayerTargets,
    Unknown(u32),
}

// Defined by ES 2 only; absent from the core headers.
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: u32 = 0x8CD9;

impl FramebufferStatus {
    /// `Ok` for `FRAMEBUFFER_COMPLETE`, the failure reason otherwise.
    pub fn check(code: u32) -> Result<(), Self> {
        let status = match code {
            glow::FRAMEBUFFER_COMPLETE => return Ok(()),
            glow::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
            glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
            FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
            glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
            glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
            glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
            glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
            glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferStatus::IncompleteLayerTargets,
            other => FramebufferStatus::Unknown(other),
        };
        Err(status)
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FramebufferStatus::Undefined => "GL_FRAMEBUFFER_UNDEFINED",
            FramebufferStatus::IncompleteAttachment => "GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT",
            FramebufferStatus::MissingAttachment => "GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT",
            FramebufferStatus::IncompleteDimensions => "GL_FRAMEBUFFER_INCOMPLETE_DIMENSIONS",
            FramebufferStatus::IncompleteDrawBuffer => "GL_FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER",
            FramebufferStatus::IncompleteReadBuffer => "GL_FRAMEBUFFER_INCOMPLETE_READ_BUFFER",
            FramebufferStatus::Unsupported => "GL_FRAMEBUFFER_UNSUPPORTED",
            FramebufferStatus::IncompleteMultisample => "GL_FRAMEBUFFER_INCOMPLETE_MULTISAMPLE",
            FramebufferStatus::IncompleteLayerTargets => "GL_FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS",
            FramebufferStatus::Unknown(code) => return write!(f, "unknown framebuffer status 0x{code:04x}"),
        };
        f.write_str(name)
    }
}

/// An offscreen render target that is current from creation until it is
/// destroyed or finished.
///
/// Canvases nest: each remembers the target and viewport that were current
/// when it was created and restores them on teardown. Teardown must happen in
/// reverse creation order.
pub struct Canvas<G: GlBackend> {
    framebuffer: G::Framebuffer,
    texture: Texture<G>,
    previous: Option<G::Framebuffer>,
    previous_viewport: Viewport,
    depth: u32,
}

impl<G: GlBackend> fmt::Debug for Canvas<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("framebuffer", &self.framebuffer)
            .field("texture", &self.texture)
            .field("previous", &self.previous)
            .field("depth", &self.depth)
            .finish()
    }
}

impl<G: GlBackend> Canvas<G> {
    #[inline]
    pub fn framebuffer(&self) -> G::Framebuffer {
        self.framebuffer
    }

    #[inline]
    pub fn texture(&self) -> &Texture<G> {
        &self.texture
    }

    /// Render target that was current when this canvas was created; `None`
    /// is the default framebuffer.
    #[inline]
    pub fn previous(&self) -> Option<G::Framebuffer> {
        self.previous
    }

    /// 1 for an outermost canvas, increasing with nesting.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width, self.texture.height)
    }
}

impl<G: GlBackend> Engine<G> {
    /// Creates an offscreen target of `width x height` pixels and makes it
    /// current.
    ///
    /// The viewport is set to cover the canvas and the target is cleared to
    /// transparent black (`with_alpha`) or opaque black. On failure the
    /// previous target is current again and nothing stays allocated.
    pub fn create_canvas(
        &mut self,
        width: u32,
        height: u32,
        with_alpha: bool,
    ) -> Result<Canvas<G>, RenderError> {
        let format = if with_alpha { PixelFormat::Rgba } else { PixelFormat::Rgb };
        let texture = self.create_texture(format, width, height, None)?;

        let gl = &self.gl;
        let previous = gl.get_parameter_framebuffer(self.caps.framebuffer_binding);
        let previous_viewport = self.viewport();

        let framebuffer = match gl.create_framebuffer() {
            Ok(fb) => fb,
            Err(reason) => {
                log::error!("unable to create canvas framebuffer: {reason}");
                gl.delete_texture(texture.raw);
                return Err(RenderError::ObjectCreation { what: "framebuffer", reason });
            }
        };

        gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
        gl.framebuffer_texture_2d(
            glow::FRAMEBUFFER,
            glow::COLOR_ATTACHMENT0,
            glow::TEXTURE_2D,
            Some(texture.raw),
            0,
        );
        if self.caps.selects_draw_buffer {
            gl.draw_buffers(&[glow::COLOR_ATTACHMENT0]);
        }

        if let Err(status) = FramebufferStatus::check(gl.check_framebuffer_status(glow::FRAMEBUFFER)) {
            log::error!("unable to create canvas: {status}");
            gl.bind_framebuffer(glow::FRAMEBUFFER, previous);
            gl.delete_framebuffer(framebuffer);
            gl.delete_texture(texture.raw);
            return Err(RenderError::IncompleteFramebuffer(status));
        }

        gl.viewport(0, 0, width as i32, height as i32);
        gl.clear_color(0.0, 0.0, 0.0, if with_alpha { 0.0 } else { 1.0 });
        gl.clear(glow::COLOR_BUFFER_BIT);

        self.open_canvases += 1;
        let depth = self.open_canvases;
        self.check("create_canvas");

        log::debug!("opened canvas {framebuffer:?} ({width}x{height}) at depth {depth}");
        Ok(Canvas { framebuffer, texture, previous, previous_viewport, depth })
    }

    /// Discards a canvas and its texture, restoring the previous target.
    pub fn destroy_canvas(&mut self, canvas: Canvas<G>) {
        let texture = self.close_canvas(canvas);
        self.gl.delete_texture(texture.raw);
    }

    /// Ends rendering into a canvas and returns its content as a texture.
    ///
    /// The returned texture is vertically flipped relative to images uploaded
    /// with [`Engine::create_texture`].
    pub fn finish_canvas(&mut self, canvas: Canvas<G>) -> Texture<G> {
        let mut texture = self.close_canvas(canvas);
        texture.flipped = true;
        texture
    }

    fn close_canvas(&mut self, canvas: Canvas<G>) -> Texture<G> {
        let Canvas { framebuffer, texture, previous, previous_viewport, depth } = canvas;

        if depth != self.open_canvases {
            log::warn!(
                "canvas at depth {depth} closed while {} canvas(es) are open; teardown must be reverse creation order",
                self.open_canvases
            );
        }
        match self.open_canvases.checked_sub(1) {
            Some(n) => self.open_canvases = n,
            None => log::warn!("canvas closed with no canvas open"),
        }

        self.gl.bind_framebuffer(glow::FRAMEBUFFER, previous);
        self.set_viewport(previous_viewport);
        self.gl.delete_framebuffer(framebuffer);
        self.check("close_canvas");

        log::debug!("closed canvas {framebuffer:?} at depth {depth}");
        texture
    }
}
