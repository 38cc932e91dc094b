//! Quad geometry and state helpers shared by all draw primitives.

use bytemuck::{Pod, Zeroable};

use crate::device::GlBackend;
use crate::error::RenderError;
use crate::shader::ShaderProgram;

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

/// Unit square in triangle-fan order.
pub(crate) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const STRIDE: i32 = std::mem::size_of::<QuadVertex>() as i32;

// ── quad geometry ─────────────────────────────────────────────────────────

/// The one vertex buffer every primitive draws from, plus the vertex array
/// object core profiles insist on.
pub(crate) struct QuadGeometry<G: GlBackend> {
    vbo: G::Buffer,
    vao: Option<G::VertexArray>,
}

impl<G: GlBackend> QuadGeometry<G> {
    pub(crate) fn create(gl: &G, with_vertex_array: bool) -> Result<Self, RenderError> {
        let vao = if with_vertex_array {
            let vao = gl.create_vertex_array().map_err(|reason| {
                log::error!("unable to create quad vertex array: {reason}");
                RenderError::ObjectCreation { what: "vertex array", reason }
            })?;
            gl.bind_vertex_array(Some(vao));
            Some(vao)
        } else {
            None
        };

        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(reason) => {
                log::error!("unable to create quad vertex buffer: {reason}");
                if let Some(vao) = vao {
                    gl.bind_vertex_array(None);
                    gl.delete_vertex_array(vao);
                }
                return Err(RenderError::ObjectCreation { what: "vertex buffer", reason });
            }
        };

        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&QUAD_VERTICES),
            glow::STATIC_DRAW,
        );
        Ok(Self { vbo, vao })
    }

    /// Makes `program` current and points its position attribute at the quad.
    pub(crate) fn bind(&self, gl: &G, program: &ShaderProgram<G>) {
        if let Some(vao) = self.vao {
            gl.bind_vertex_array(Some(vao));
        }
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        gl.use_program(Some(program.raw()));
        gl.vertex_attrib_pointer_f32(program.position(), 2, glow::FLOAT, false, STRIDE, 0);
        gl.enable_vertex_attrib_array(program.position());
    }

    #[inline]
    pub(crate) fn draw(&self, gl: &G) {
        gl.draw_arrays(glow::TRIANGLE_FAN, 0, QUAD_VERTICES.len() as i32);
    }

    pub(crate) fn delete(self, gl: &G) {
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.delete_buffer(self.vbo);
        if let Some(vao) = self.vao {
            gl.bind_vertex_array(None);
            gl.delete_vertex_array(vao);
        }
    }
}

// ── blend bracket ─────────────────────────────────────────────────────────

/// Runs `draw` with blending enabled only when `needed`.
///
/// Blending is off between draws. A primitive that turns it on turns it off
/// again right after its draw call; one that does not need it never touches
/// the flag.
pub(super) fn with_blend<G: GlBackend>(gl: &G, needed: bool, draw: impl FnOnce()) {
    if needed {
        gl.enable(glow::BLEND);
    }
    draw();
    if needed {
        gl.disable(glow::BLEND);
    }
}
