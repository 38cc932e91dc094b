//! GLSL sources for the three built-in programs.
//!
//! Each program is written once against a small dialect table; the two
//! variants differ only in qualifiers, the sampling function and the fragment
//! output.

use super::Dialect;

/// Vertex + fragment source of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPair {
    pub vertex: String,
    pub fragment: String,
}

/// Sources for every program the engine links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSet {
    pub image: ShaderPair,
    pub rect: ShaderPair,
    pub mask: ShaderPair,
}

struct Glsl {
    version: &'static str,
    attribute: &'static str,
    vertex_out: &'static str,
    fragment_in: &'static str,
    sample: &'static str,
    output_decl: &'static str,
    output: &'static str,
}

const GLES2: Glsl = Glsl {
    version: "#version 100",
    attribute: "attribute",
    vertex_out: "varying",
    fragment_in: "varying",
    sample: "texture2D",
    output_decl: "",
    output: "gl_FragColor",
};

const GLSL150: Glsl = Glsl {
    version: "#version 150",
    attribute: "in",
    vertex_out: "out",
    fragment_in: "in",
    sample: "texture",
    output_decl: "out vec4 fragColor;\n",
    output: "fragColor",
};

/// GLSL expression applying the affine `vec2[3]` uniform `m` to `v`.
fn affine(m: &str, v: &str) -> String {
    format!(
        "vec2({m}[0].x * {v}.x + {m}[1].x * {v}.y + {m}[2].x, \
         {m}[0].y * {v}.x + {m}[1].y * {v}.y + {m}[2].y)"
    )
}

impl ShaderSet {
    pub fn for_dialect(dialect: Dialect) -> Self {
        let g = match dialect {
            Dialect::Gles2 => &GLES2,
            Dialect::Glsl150 => &GLSL150,
        };
        Self {
            image: image(g),
            rect: rect(g),
            mask: mask(g),
        }
    }
}

fn image(g: &Glsl) -> ShaderPair {
    let vertex = format!(
        "{version}\n\
         uniform vec2 u_transform[3];\n\
         {attribute} vec2 a_position;\n\
         {out} vec2 v_texCoord;\n\
         void main() {{\n\
         \x20 gl_Position = vec4({pos}, 0.0, 1.0);\n\
         \x20 v_texCoord = vec2(a_position.x, 1.0 - a_position.y);\n\
         }}\n",
        version = g.version,
        attribute = g.attribute,
        out = g.vertex_out,
        pos = affine("u_transform", "a_position"),
    );
    let fragment = format!(
        "{version}\n\
         precision mediump float;\n\
         {input} vec2 v_texCoord;\n\
         {decl}\
         uniform sampler2D s_texture;\n\
         uniform float u_alpha;\n\
         void main() {{\n\
         \x20 vec4 c = {sample}(s_texture, v_texCoord);\n\
         \x20 {output} = vec4(c.rgb, u_alpha * c.a);\n\
         }}\n",
        version = g.version,
        input = g.fragment_in,
        decl = g.output_decl,
        sample = g.sample,
        output = g.output,
    );
    ShaderPair { vertex, fragment }
}

fn rect(g: &Glsl) -> ShaderPair {
    let vertex = format!(
        "{version}\n\
         uniform vec2 u_transform[3];\n\
         {attribute} vec2 a_position;\n\
         void main() {{\n\
         \x20 gl_Position = vec4({pos}, 0.0, 1.0);\n\
         }}\n",
        version = g.version,
        attribute = g.attribute,
        pos = affine("u_transform", "a_position"),
    );
    let fragment = format!(
        "{version}\n\
         precision mediump float;\n\
         {decl}\
         uniform vec4 u_color;\n\
         void main() {{\n\
         \x20 {output} = u_color;\n\
         }}\n",
        version = g.version,
        decl = g.output_decl,
        output = g.output,
    );
    ShaderPair { vertex, fragment }
}

fn mask(g: &Glsl) -> ShaderPair {
    let vertex = format!(
        "{version}\n\
         uniform vec2 u_posTrans[3];\n\
         uniform vec2 u_texTrans[3];\n\
         {attribute} vec2 a_position;\n\
         {out} vec2 v_texCoord;\n\
         void main() {{\n\
         \x20 gl_Position = vec4({pos}, 0.0, 1.0);\n\
         \x20 vec2 flipped = vec2(a_position.x, 1.0 - a_position.y);\n\
         \x20 v_texCoord = {tex};\n\
         }}\n",
        version = g.version,
        attribute = g.attribute,
        out = g.vertex_out,
        pos = affine("u_posTrans", "a_position"),
        tex = affine("u_texTrans", "flipped"),
    );
    let fragment = format!(
        "{version}\n\
         precision mediump float;\n\
         {input} vec2 v_texCoord;\n\
         {decl}\
         uniform sampler2D s_texture;\n\
         uniform vec4 u_primary;\n\
         uniform vec4 u_secondary;\n\
         void main() {{\n\
         \x20 float a = {sample}(s_texture, v_texCoord).r;\n\
         \x20 {output} = a * u_primary + (1.0 - a) * u_secondary;\n\
         }}\n",
        version = g.version,
        input = g.fragment_in,
        decl = g.output_decl,
        sample = g.sample,
        output = g.output,
    );
    ShaderPair { vertex, fragment }
}
