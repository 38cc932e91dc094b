use std::fmt;

use crate::device::GlBackend;
use crate::error::RenderError;

use super::sources::ShaderPair;

/// Pipeline stage of a shader object.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// The three built-in programs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgramKind {
    Image,
    Rect,
    Mask,
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProgramKind::Image => "image",
            ProgramKind::Rect => "rect",
            ProgramKind::Mask => "mask",
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotKind {
    Attribute,
    Uniform,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotKind::Attribute => "attribute",
            SlotKind::Uniform => "uniform",
        })
    }
}

/// What a slot is used for, independent of its GLSL spelling.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Semantic {
    Position,
    Transform,
    Texture,
    Alpha,
    Color,
    PosTrans,
    TexTrans,
    Primary,
    Secondary,
}

/// One required attribute or uniform.
#[derive(Debug, Copy, Clone)]
pub struct Slot {
    pub semantic: Semantic,
    pub name: &'static str,
    pub kind: SlotKind,
}

const fn attribute(semantic: Semantic, name: &'static str) -> Slot {
    Slot { semantic, name, kind: SlotKind::Attribute }
}

const fn uniform(semantic: Semantic, name: &'static str) -> Slot {
    Slot { semantic, name, kind: SlotKind::Uniform }
}

const IMAGE_SLOTS: &[Slot] = &[
    uniform(Semantic::Transform, "u_transform"),
    attribute(Semantic::Position, "a_position"),
    uniform(Semantic::Texture, "s_texture"),
    uniform(Semantic::Alpha, "u_alpha"),
];

const RECT_SLOTS: &[Slot] = &[
    uniform(Semantic::Transform, "u_transform"),
    attribute(Semantic::Position, "a_position"),
    uniform(Semantic::Color, "u_color"),
];

const MASK_SLOTS: &[Slot] = &[
    uniform(Semantic::PosTrans, "u_posTrans"),
    uniform(Semantic::TexTrans, "u_texTrans"),
    attribute(Semantic::Position, "a_position"),
    uniform(Semantic::Texture, "s_texture"),
    uniform(Semantic::Primary, "u_primary"),
    uniform(Semantic::Secondary, "u_secondary"),
];

impl ProgramKind {
    /// Every slot the program must expose. Each table has exactly one
    /// attribute, the quad position.
    pub fn slots(self) -> &'static [Slot] {
        match self {
            ProgramKind::Image => IMAGE_SLOTS,
            ProgramKind::Rect => RECT_SLOTS,
            ProgramKind::Mask => MASK_SLOTS,
        }
    }
}

/// A linked program whose every required slot resolved.
///
/// There is no way to obtain a partially resolved value: [`ShaderProgram::link`]
/// either returns a complete program or deletes what it created.
pub struct ShaderProgram<G: GlBackend> {
    raw: G::Program,
    kind: ProgramKind,
    position: u32,
    uniforms: Vec<(Semantic, G::UniformLocation)>,
}

impl<G: GlBackend> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("raw", &self.raw)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<G: GlBackend> ShaderProgram<G> {
    /// Compiles, links and resolves the program `kind` from `sources`.
    pub fn link(gl: &G, kind: ProgramKind, sources: &ShaderPair) -> Result<Self, RenderError> {
        let raw = link_program(gl, kind, &sources.vertex, &sources.fragment)?;

        let mut position = None;
        let mut uniforms = Vec::with_capacity(kind.slots().len());
        for slot in kind.slots() {
            let resolved = match slot.kind {
                SlotKind::Attribute => gl
                    .get_attrib_location(raw, slot.name)
                    .map(|index| position = Some(index)),
                SlotKind::Uniform => gl
                    .get_uniform_location(raw, slot.name)
                    .map(|loc| uniforms.push((slot.semantic, loc))),
            };
            if resolved.is_none() {
                log::error!("failed to get {} {} of {kind} program", slot.kind, slot.name);
                gl.delete_program(raw);
                return Err(RenderError::MissingSlot {
                    program: kind,
                    name: slot.name,
                    kind: slot.kind,
                });
            }
        }

        let Some(position) = position else {
            gl.delete_program(raw);
            return Err(RenderError::MissingSlot {
                program: kind,
                name: "a_position",
                kind: SlotKind::Attribute,
            });
        };

        log::debug!("linked {kind} program {raw:?}");
        Ok(Self { raw, kind, position, uniforms })
    }

    #[inline]
    pub fn raw(&self) -> G::Program {
        self.raw
    }

    #[inline]
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    /// Attribute index of the quad position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Uniform location for `semantic`, `None` if the program has no such slot.
    pub fn uniform(&self, semantic: Semantic) -> Option<&G::UniformLocation> {
        self.uniforms
            .iter()
            .find(|(s, _)| *s == semantic)
            .map(|(_, loc)| loc)
    }

    pub fn delete(self, gl: &G) {
        gl.delete_program(self.raw);
        log::trace!("deleted {} program {:?}", self.kind, self.raw);
    }
}

/// Compiles one stage; on failure the shader object is deleted.
fn compile_shader<G: GlBackend>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, RenderError> {
    let shader = gl.create_shader(stage.gl_enum()).map_err(|reason| {
        log::error!("unable to create {stage} shader: {reason}");
        RenderError::ObjectCreation { what: "shader", reason }
    })?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if gl.get_shader_compile_status(shader) {
        return Ok(shader);
    }

    let info = gl.get_shader_info_log(shader);
    let info = if info.trim().is_empty() {
        "unknown problem compiling shader".to_string()
    } else {
        info
    };
    log::error!(
        "error compiling {stage} shader:\n-----------------------\n{source}\n-----------------------\n{info}"
    );
    gl.delete_shader(shader);
    Err(RenderError::Compile {
        stage,
        source_text: source.to_string(),
        log: info,
    })
}

/// Compiles both stages and links them.
///
/// Shader objects never outlive this call. On any failure nothing created here
/// stays allocated.
pub fn link_program<G: GlBackend>(
    gl: &G,
    kind: ProgramKind,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<G::Program, RenderError> {
    let vs = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
    let fs = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
        Ok(fs) => fs,
        Err(e) => {
            gl.delete_shader(vs);
            return Err(e);
        }
    };

    let program = match gl.create_program() {
        Ok(p) => p,
        Err(reason) => {
            log::error!("unable to create {kind} program: {reason}");
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(RenderError::ObjectCreation { what: "program", reason });
        }
    };

    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    gl.link_program(program);

    gl.detach_shader(program, vs);
    gl.detach_shader(program, fs);
    gl.delete_shader(vs);
    gl.delete_shader(fs);

    if gl.get_program_link_status(program) {
        return Ok(program);
    }

    let info = gl.get_program_info_log(program);
    let info = if info.trim().is_empty() {
        "unknown problem linking program".to_string()
    } else {
        info
    };
    log::error!("error linking {kind} program:\n{info}");
    gl.delete_program(program);
    Err(RenderError::Link { program: kind, log: info })
}
