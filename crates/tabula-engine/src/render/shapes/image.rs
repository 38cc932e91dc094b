use crate::coords::Transform;
use crate::device::GlBackend;
use crate::render::{Engine, Texture};
use crate::shader::Semantic;

use super::common::with_blend;

impl<G: GlBackend> Engine<G> {
    /// Draws `texture` on the unit quad placed by `transform` (quad space to
    /// clip space), scaled in opacity by `alpha / 255`.
    ///
    /// Blends only when the result can be non-opaque.
    pub fn draw_image(&self, texture: &Texture<G>, transform: Transform, alpha: u8) {
        let gl = &self.gl;
        let program = &self.image;
        let blend = alpha != u8::MAX || texture.has_transparency();

        with_blend(gl, blend, || {
            self.quad.bind(gl, program);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture.raw()));
            gl.uniform_1_i32(program.uniform(Semantic::Texture), 0);
            gl.uniform_1_f32(program.uniform(Semantic::Alpha), f32::from(alpha) / 255.0);
            gl.uniform_2_f32_slice(program.uniform(Semantic::Transform), transform.to_uniform());
            self.quad.draw(gl);
        });
        self.check("draw_image");
    }
}
