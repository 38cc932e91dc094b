use crate::coords::Transform;
use crate::device::GlBackend;
use crate::error::RenderError;
use crate::paint::Color;
use crate::render::{Engine, Texture};
use crate::shader::Semantic;

impl<G: GlBackend> Engine<G> {
    /// Two-color fill weighted by a single-channel texture.
    ///
    /// `pos_transform` places the quad in clip space. `tex_transform` maps the
    /// vertically flipped quad coordinate into texture space, so a sub-region
    /// of an atlas can be addressed through wrapping. Each covered pixel is
    /// replaced by `v * primary + (1 - v) * secondary`, with `v` the sampled
    /// channel value. Never blends.
    pub fn draw_mask(
        &self,
        texture: &Texture<G>,
        pos_transform: Transform,
        tex_transform: Transform,
        primary: Color,
        secondary: Color,
    ) -> Result<(), RenderError> {
        let Some(program) = &self.mask else {
            return Err(RenderError::MaskUnavailable);
        };
        let gl = &self.gl;

        self.quad.bind(gl, program);
        gl.active_texture(glow::TEXTURE0);
        gl.bind_texture(glow::TEXTURE_2D, Some(texture.raw()));
        gl.uniform_1_i32(program.uniform(Semantic::Texture), 0);
        gl.uniform_2_f32_slice(program.uniform(Semantic::PosTrans), pos_transform.to_uniform());
        gl.uniform_2_f32_slice(program.uniform(Semantic::TexTrans), tex_transform.to_uniform());
        let [r, g, b, a] = primary.normalized();
        gl.uniform_4_f32(program.uniform(Semantic::Primary), r, g, b, a);
        let [r, g, b, a] = secondary.normalized();
        gl.uniform_4_f32(program.uniform(Semantic::Secondary), r, g, b, a);
        self.quad.draw(gl);

        self.check("draw_mask");
        Ok(())
    }
}
