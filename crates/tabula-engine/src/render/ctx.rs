use crate::coords::Viewport;
use crate::device::{check_gl_error, EngineConfig, GlBackend};
use crate::error::RenderError;
use crate::paint::Color;
use crate::shader::{Capabilities, Dialect, ProgramKind, ShaderProgram, ShaderSet};

use super::shapes::QuadGeometry;

/// Rendering engine bound to one GL context.
///
/// Owns the backend, the shared quad, and the three programs. All methods must
/// be called on the thread that owns the context, with that context current.
///
/// Global state after [`Engine::init`]: depth test off, depth writes off,
/// blend function `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`, blending off.
pub struct Engine<G: GlBackend> {
    pub(super) gl: G,
    pub(super) caps: Capabilities,
    pub(super) config: EngineConfig,
    pub(super) quad: QuadGeometry<G>,
    pub(super) image: ShaderProgram<G>,
    pub(super) rect: ShaderProgram<G>,
    pub(super) mask: Option<ShaderProgram<G>>,
    pub(super) open_canvases: u32,
    pub(super) max_texture_size: u32,
}

struct Programs<G: GlBackend> {
    image: ShaderProgram<G>,
    rect: ShaderProgram<G>,
    mask: Option<ShaderProgram<G>>,
}

impl<G: GlBackend> Programs<G> {
    /// Links every program, releasing earlier ones when a later one fails.
    fn link(gl: &G, shaders: &ShaderSet, with_mask: bool) -> Result<Self, RenderError> {
        let image = ShaderProgram::link(gl, ProgramKind::Image, &shaders.image)?;
        let rect = match ShaderProgram::link(gl, ProgramKind::Rect, &shaders.rect) {
            Ok(rect) => rect,
            Err(e) => {
                image.delete(gl);
                return Err(e);
            }
        };
        let mask = if with_mask {
            match ShaderProgram::link(gl, ProgramKind::Mask, &shaders.mask) {
                Ok(mask) => Some(mask),
                Err(e) => {
                    image.delete(gl);
                    rect.delete(gl);
                    return Err(e);
                }
            }
        } else {
            None
        };
        Ok(Self { image, rect, mask })
    }
}

impl<G: GlBackend> Engine<G> {
    /// Creates the shared quad, links all programs and sets global state.
    ///
    /// The context must be current. On error everything created so far has
    /// been released and the backend is dropped.
    pub fn init(gl: G, config: EngineConfig) -> Result<Self, RenderError> {
        let shaders = ShaderSet::for_dialect(config.dialect);
        Self::init_with(gl, config, shaders)
    }

    /// [`Engine::init`] with caller-provided shader sources.
    pub(crate) fn init_with(
        gl: G,
        config: EngineConfig,
        shaders: ShaderSet,
    ) -> Result<Self, RenderError> {
        let mut caps = Capabilities::resolve(config.dialect);
        caps.shaders = shaders;

        let quad = QuadGeometry::create(&gl, caps.needs_vertex_array)?;
        let programs = match Programs::link(&gl, &caps.shaders, config.enable_mask) {
            Ok(p) => p,
            Err(e) => {
                quad.delete(&gl);
                log::error!("engine init failed: {e}");
                return Err(e);
            }
        };

        gl.disable(glow::DEPTH_TEST);
        gl.depth_mask(false);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        gl.disable(glow::BLEND);

        let max_texture_size = gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE).max(0) as u32;

        let engine = Self {
            gl,
            caps,
            config,
            quad,
            image: programs.image,
            rect: programs.rect,
            mask: programs.mask,
            open_canvases: 0,
            max_texture_size,
        };
        engine.check("init");

        log::info!(
            "engine initialized: dialect={:?}, mask={}, max_texture_size={}",
            engine.caps.dialect,
            engine.mask.is_some(),
            engine.max_texture_size,
        );
        Ok(engine)
    }

    /// Releases programs and the quad and hands the backend back.
    ///
    /// Textures and canvases created by the host are not tracked; any still
    /// alive leak with the context.
    pub fn shutdown(self) -> G {
        let Self { gl, quad, image, rect, mask, open_canvases, .. } = self;
        if open_canvases > 0 {
            log::warn!("engine shut down with {open_canvases} canvas(es) still open");
        }
        gl.use_program(None);
        image.delete(&gl);
        rect.delete(&gl);
        if let Some(mask) = mask {
            mask.delete(&gl);
        }
        quad.delete(&gl);
        log::debug!("engine shut down");
        gl
    }

    #[inline]
    pub fn gl(&self) -> &G {
        &self.gl
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.caps.dialect
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `GL_MAX_TEXTURE_SIZE` as reported at init.
    #[inline]
    pub fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    #[inline]
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Number of canvases created and not yet destroyed or finished.
    #[inline]
    pub fn open_canvas_count(&self) -> u32 {
        self.open_canvases
    }

    pub fn viewport(&self) -> Viewport {
        let mut v = [0; 4];
        self.gl.get_parameter_i32_slice(glow::VIEWPORT, &mut v);
        Viewport::from_array(v)
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.gl.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
    }

    /// Fills the current render target with `color`.
    pub fn clear(&self, color: Color) {
        let [r, g, b, a] = color.normalized();
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(glow::COLOR_BUFFER_BIT);
        self.check("clear");
    }

    /// Polls the GL error flag when enabled by the config.
    pub(super) fn check(&self, call: &str) {
        if self.config.check_errors {
            check_gl_error(&self.gl, call);
        }
    }
}

impl<G: GlBackend> std::fmt::Debug for Engine<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dialect", &self.caps.dialect)
            .field("mask", &self.mask.is_some())
            .field("open_canvases", &self.open_canvases)
            .field("max_texture_size", &self.max_texture_size)
            .finish_non_exhaustive()
    }
}
