use crate::coords::Transform;
use crate::device::GlBackend;
use crate::paint::Color;
use crate::render::Engine;
use crate::shader::Semantic;

use super::common::with_blend;

impl<G: GlBackend> Engine<G> {
    /// Fills the unit quad placed by `transform` with a flat `color`.
    ///
    /// With `copy_alpha` the color, alpha included, is written as is; without
    /// it a non-opaque color is blended over the target.
    pub fn draw_rect(&self, transform: Transform, color: Color, copy_alpha: bool) {
        let gl = &self.gl;
        let program = &self.rect;
        let blend = !copy_alpha && !color.is_opaque();

        with_blend(gl, blend, || {
            self.quad.bind(gl, program);
            let [r, g, b, a] = color.normalized();
            gl.uniform_4_f32(program.uniform(Semantic::Color), r, g, b, a);
            gl.uniform_2_f32_slice(program.uniform(Semantic::Transform), transform.to_uniform());
            self.quad.draw(gl);
        });
        self.check("draw_rect");
    }
}
