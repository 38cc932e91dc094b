//! Software stand-in for a GL context.
//!
//! `FakeGl` tracks object lifetimes and the bits of global state the engine
//! touches, and rasterizes triangle fans with the three built-in programs
//! emulated on the CPU. Clones share state, so a test can keep a handle
//! while the engine owns another.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Once;

use super::GlBackend;

const LUMINANCE: u32 = 0x1909;
const MAX_TEXTURE_SIZE: i32 = 4096;

/// Uniform handle: owning program and declaration index.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeUniform {
    program: u32,
    index: usize,
}

/// Object kinds whose creation can be made to fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum FakeObject {
    Program,
    Buffer,
    VertexArray,
    Texture,
    Framebuffer,
}

#[derive(Clone)]
pub(crate) struct FakeGl {
    state: Rc<RefCell<State>>,
}

// ── objects ───────────────────────────────────────────────────────────────

struct Shader {
    kind: u32,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct Program {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    core: bool,
    attributes: Vec<String>,
    uniforms: Vec<String>,
    values: HashMap<usize, Vec<f32>>,
}

impl Program {
    fn value(&self, name: &str) -> Vec<f32> {
        self.uniforms
            .iter()
            .position(|u| u == name)
            .and_then(|i| self.values.get(&i).cloned())
            .unwrap_or_default()
    }

    fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.iter().any(|u| u == name)
    }
}

#[derive(Clone)]
struct Image {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Image {
    fn blank(width: usize, height: usize, channels: usize) -> Self {
        Self { width, height, channels, data: vec![0; width * height * channels] }
    }

    fn texel(&self, x: usize, y: usize) -> &[u8] {
        let i = (y * self.width + x) * self.channels;
        &self.data[i..i + self.channels]
    }

    fn rgba(&self, x: usize, y: usize) -> [f32; 4] {
        let t: Vec<f32> = self.texel(x, y).iter().map(|&b| f32::from(b) / 255.0).collect();
        match self.channels {
            1 => [t[0], t[0], t[0], 1.0],
            3 => [t[0], t[1], t[2], 1.0],
            _ => [t[0], t[1], t[2], t[3]],
        }
    }

    fn store(&mut self, x: usize, y: usize, color: [f32; 4]) {
        let i = (y * self.width + x) * self.channels;
        for k in 0..self.channels {
            self.data[i + k] = (color[k].clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }

    fn fill(&mut self, color: [f32; 4]) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.store(x, y, color);
            }
        }
    }

    /// Nearest filtering, repeat wrapping.
    fn sample(&self, s: f32, t: f32) -> [f32; 4] {
        let wrap = |v: f32, n: usize| (((v - v.floor()) * n as f32) as usize).min(n - 1);
        self.rgba(wrap(s, self.width), wrap(t, self.height))
    }
}

#[derive(Default)]
struct Texture {
    image: Option<Image>,
    params: HashMap<u32, i32>,
}

#[derive(Copy, Clone)]
struct AttribPointer {
    buffer: u32,
    stride: usize,
    offset: usize,
}

// ── state ─────────────────────────────────────────────────────────────────

struct State {
    next_id: u32,
    shaders: HashMap<u32, Shader>,
    programs: HashMap<u32, Program>,
    buffers: HashMap<u32, Vec<u8>>,
    vertex_arrays: HashSet<u32>,
    textures: HashMap<u32, Texture>,
    framebuffers: HashMap<u32, Option<u32>>,
    surface: Image,

    current_program: Option<u32>,
    array_buffer: Option<u32>,
    vertex_array: Option<u32>,
    attribs: HashMap<u32, AttribPointer>,
    enabled_attribs: HashSet<u32>,
    active_unit: u32,
    bound_textures: HashMap<u32, u32>,
    framebuffer: Option<u32>,
    draw_buffers: Vec<u32>,

    caps: HashSet<u32>,
    blend_toggles: usize,
    blend_func: (u32, u32),
    depth_mask: bool,
    unpack_alignment: usize,
    viewport: [i32; 4],
    clear_color: [f32; 4],

    errors: Vec<u32>,
    draws: usize,
    fail_link: Option<String>,
    fail_create: Option<FakeObject>,
    forced_status: Option<u32>,
}

impl State {
    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Next id for a new `kind`, or the driver's complaint when a failure
    /// was queued for it.
    fn allocate(&mut self, kind: FakeObject) -> Result<u32, String> {
        if self.fail_create.take_if(|k| *k == kind).is_some() {
            return Err(format!("out of memory creating {kind:?}"));
        }
        Ok(self.id())
    }

    fn raise(&mut self, error: u32) {
        self.errors.push(error);
    }

    fn bound_texture(&self) -> Option<u32> {
        self.bound_textures.get(&self.active_unit).copied()
    }

    fn target_mut(&mut self) -> Option<&mut Image> {
        match self.framebuffer {
            None => Some(&mut self.surface),
            Some(fb) => {
                let tex = self.framebuffers.get(&fb).copied().flatten()?;
                self.textures.get_mut(&tex)?.image.as_mut()
            }
        }
    }

    fn set_uniform(&mut self, location: Option<&FakeUniform>, values: Vec<f32>) {
        let Some(location) = location else { return };
        if self.current_program != Some(location.program) {
            self.raise(glow::INVALID_OPERATION);
            return;
        }
        if let Some(program) = self.programs.get_mut(&location.program) {
            program.values.insert(location.index, values);
        }
    }

    fn link(&mut self, id: u32) {
        let fail = self.fail_link.take();
        let Some(program) = self.programs.get(&id) else {
            self.raise(glow::INVALID_VALUE);
            return;
        };

        let stage = |kind: u32| {
            program
                .attached
                .iter()
                .filter_map(|s| self.shaders.get(s))
                .find(|s| s.kind == kind && s.compiled)
        };
        let result = match (fail, stage(glow::VERTEX_SHADER), stage(glow::FRAGMENT_SHADER)) {
            (Some(log), _, _) => Err(log),
            (None, Some(vs), Some(fs)) => {
                let mut attributes = declarations(&vs.source, "attribute");
                attributes.extend(declarations(&vs.source, "in"));
                let mut uniforms = declarations(&vs.source, "uniform");
                for name in declarations(&fs.source, "uniform") {
                    if !uniforms.contains(&name) {
                        uniforms.push(name);
                    }
                }
                Ok((vs.source.starts_with("#version 150"), attributes, uniforms))
            }
            _ => Err("program needs a compiled vertex and fragment shader".to_string()),
        };

        let Some(program) = self.programs.get_mut(&id) else { return };
        match result {
            Ok((core, attributes, uniforms)) => {
                program.linked = true;
                program.core = core;
                program.attributes = attributes;
                program.uniforms = uniforms;
                program.values.clear();
                program.log.clear();
            }
            Err(log) => {
                program.linked = false;
                program.log = log;
            }
        }
    }

    fn upload(&mut self, width: i32, height: i32, format: u32, pixels: Option<&[u8]>) {
        let Some(tex) = self.bound_texture() else {
            self.raise(glow::INVALID_OPERATION);
            return;
        };
        if width <= 0 || height <= 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            self.raise(glow::INVALID_VALUE);
            return;
        }
        let channels = match format {
            glow::RGBA => 4,
            glow::RGB => 3,
            LUMINANCE | glow::RED => 1,
            _ => {
                self.raise(glow::INVALID_ENUM);
                return;
            }
        };
        let (w, h) = (width as usize, height as usize);
        let mut image = Image::blank(w, h, channels);

        if let Some(pixels) = pixels {
            let row = w * channels;
            let stride = row.div_ceil(self.unpack_alignment) * self.unpack_alignment;
            let mut overrun = false;
            for y in 0..h {
                for i in 0..row {
                    match pixels.get(y * stride + i) {
                        Some(&b) => image.data[y * row + i] = b,
                        None => overrun = true,
                    }
                }
            }
            if overrun {
                self.raise(glow::INVALID_OPERATION);
            }
        }

        if let Some(texture) = self.textures.get_mut(&tex) {
            texture.image = Some(image);
        }
    }

    /// Vertex positions and a snapshot of the program inputs, `None` when the
    /// draw is invalid.
    fn prepare_draw(&self, first: usize) -> Option<(Vec<[f32; 2]>, Shading)> {
        let program = self.programs.get(&self.current_program?)?;
        if !program.linked || (program.core && self.vertex_array.is_none()) {
            return None;
        }
        let quad = self.quad_positions(program, first)?;
        let shading = Shading::capture(program, |unit| {
            self.bound_textures
                .get(&unit)
                .and_then(|t| self.textures.get(t))
                .and_then(|t| t.image.clone())
        });
        Some((quad, shading))
    }

    fn rasterize(&mut self, first: usize) {
        let Some((quad, shading)) = self.prepare_draw(first) else {
            self.raise(glow::INVALID_OPERATION);
            return;
        };
        let clip: Vec<[f32; 2]> = quad.iter().map(|&p| affine(&shading.position(), p)).collect();

        let blend = self.caps.contains(&glow::BLEND);
        let [vx, vy, vw, vh] = self.viewport;
        let Some(target) = self.target_mut() else { return };

        for py in 0..target.height {
            for px in 0..target.width {
                let (x, y) = (px as i32, py as i32);
                if x < vx || y < vy || x >= vx + vw || y >= vy + vh {
                    continue;
                }
                let p = [
                    (px as f32 + 0.5 - vx as f32) / vw as f32 * 2.0 - 1.0,
                    (py as f32 + 0.5 - vy as f32) / vh as f32 * 2.0 - 1.0,
                ];
                let Some(uv) = fan_coordinate(&clip, &quad, p) else { continue };

                let src = shading.shade(uv);
                let out = if blend {
                    let dst = target.rgba(px, py);
                    let a = src[3];
                    [0, 1, 2, 3].map(|k| src[k] * a + dst[k] * (1.0 - a))
                } else {
                    src
                };
                target.store(px, py, out);
            }
        }
    }

    fn quad_positions(&self, program: &Program, first: usize) -> Option<Vec<[f32; 2]>> {
        let index = program.attributes.iter().position(|a| a == "a_position")? as u32;
        if !self.enabled_attribs.contains(&index) {
            return None;
        }
        let pointer = self.attribs.get(&index)?;
        let bytes = self.buffers.get(&pointer.buffer)?;
        let float = |at: usize| -> Option<f32> {
            Some(f32::from_ne_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
        };
        (first..first + 4)
            .map(|i| {
                let at = pointer.offset + i * pointer.stride;
                Some([float(at)?, float(at + 4)?])
            })
            .collect()
    }
}

// ── program emulation ─────────────────────────────────────────────────────

enum Shading {
    Image { transform: Vec<f32>, alpha: f32, texture: Option<Image> },
    Rect { transform: Vec<f32>, color: Vec<f32> },
    Mask {
        position: Vec<f32>,
        texture_transform: Vec<f32>,
        texture: Option<Image>,
        primary: Vec<f32>,
        secondary: Vec<f32>,
    },
}

impl Shading {
    fn capture(program: &Program, texture_unit: impl Fn(u32) -> Option<Image>) -> Self {
        let unit = |p: &Program| p.value("s_texture").first().copied().unwrap_or(0.0) as u32;
        if program.has_uniform("u_primary") {
            Shading::Mask {
                position: program.value("u_posTrans"),
                texture_transform: program.value("u_texTrans"),
                texture: texture_unit(unit(program)),
                primary: program.value("u_primary"),
                secondary: program.value("u_secondary"),
            }
        } else if program.has_uniform("u_alpha") {
            Shading::Image {
                transform: program.value("u_transform"),
                alpha: program.value("u_alpha").first().copied().unwrap_or(0.0),
                texture: texture_unit(unit(program)),
            }
        } else {
            Shading::Rect {
                transform: program.value("u_transform"),
                color: program.value("u_color"),
            }
        }
    }

    fn position(&self) -> Vec<f32> {
        match self {
            Shading::Image { transform, .. } | Shading::Rect { transform, .. } => transform.clone(),
            Shading::Mask { position, .. } => position.clone(),
        }
    }

    fn shade(&self, [u, v]: [f32; 2]) -> [f32; 4] {
        let sample = |texture: &Option<Image>, [s, t]: [f32; 2]| {
            texture.as_ref().map_or([0.0, 0.0, 0.0, 1.0], |img| img.sample(s, t))
        };
        match self {
            Shading::Image { alpha, texture, .. } => {
                let c = sample(texture, [u, 1.0 - v]);
                [c[0], c[1], c[2], alpha * c[3]]
            }
            Shading::Rect { color, .. } => vec4(color),
            Shading::Mask { texture_transform, texture, primary, secondary, .. } => {
                let tc = affine(texture_transform, [u, 1.0 - v]);
                let a = sample(texture, tc)[0];
                let (p, s) = (vec4(primary), vec4(secondary));
                [0, 1, 2, 3].map(|k| a * p[k] + (1.0 - a) * s[k])
            }
        }
    }
}

fn vec4(v: &[f32]) -> [f32; 4] {
    let at = |i: usize| v.get(i).copied().unwrap_or(0.0);
    [at(0), at(1), at(2), at(3)]
}

fn affine(m: &[f32], [x, y]: [f32; 2]) -> [f32; 2] {
    let at = |i: usize| m.get(i).copied().unwrap_or(0.0);
    [at(0) * x + at(2) * y + at(4), at(1) * x + at(3) * y + at(5)]
}

/// Interpolated quad coordinate at clip point `p`, if the fan covers it.
fn fan_coordinate(clip: &[[f32; 2]], quad: &[[f32; 2]], p: [f32; 2]) -> Option<[f32; 2]> {
    (1..clip.len() - 1).find_map(|i| {
        let w = barycentric(p, clip[0], clip[i], clip[i + 1])?;
        Some([0, 1].map(|k| w[0] * quad[0][k] + w[1] * quad[i][k] + w[2] * quad[i + 1][k]))
    })
}

fn barycentric(p: [f32; 2], a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> Option<[f32; 3]> {
    let d = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if d == 0.0 {
        return None;
    }
    let w0 = ((b[1] - c[1]) * (p[0] - c[0]) + (c[0] - b[0]) * (p[1] - c[1])) / d;
    let w1 = ((c[1] - a[1]) * (p[0] - c[0]) + (a[0] - c[0]) * (p[1] - c[1])) / d;
    let w2 = 1.0 - w0 - w1;
    const EPS: f32 = -1e-6;
    (w0 >= EPS && w1 >= EPS && w2 >= EPS).then_some([w0, w1, w2])
}

/// Names declared by lines of the form `<qualifier> <type> <name>;`.
fn declarations(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            if words.next()? != qualifier {
                return None;
            }
            let _ty = words.next()?;
            let name = words.next()?.trim_end_matches(';');
            Some(name.split('[').next()?.to_string())
        })
        .collect()
}

// ── test API ──────────────────────────────────────────────────────────────

impl FakeGl {
    /// Context whose default framebuffer is `width x height` RGBA, all zero.
    pub(crate) fn new(width: usize, height: usize) -> Self {
        let state = State {
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashSet::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            surface: Image::blank(width, height, 4),
            current_program: None,
            array_buffer: None,
            vertex_array: None,
            attribs: HashMap::new(),
            enabled_attribs: HashSet::new(),
            active_unit: 0,
            bound_textures: HashMap::new(),
            framebuffer: None,
            draw_buffers: Vec::new(),
            caps: HashSet::new(),
            blend_toggles: 0,
            blend_func: (glow::ONE, glow::ZERO),
            depth_mask: true,
            unpack_alignment: 4,
            viewport: [0, 0, width as i32, height as i32],
            clear_color: [0.0; 4],
            errors: Vec::new(),
            draws: 0,
            fail_link: None,
            fail_create: None,
            forced_status: None,
        };
        Self { state: Rc::new(RefCell::new(state)) }
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub(crate) fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub(crate) fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub(crate) fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    /// Makes the next link fail with `log`.
    pub(crate) fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().fail_link = Some(log.to_string());
    }

    /// Makes the next creation of a `kind` object fail.
    pub(crate) fn fail_next_create(&self, kind: FakeObject) {
        self.state.borrow_mut().fail_create = Some(kind);
    }

    /// Makes the next completeness check report `status`.
    pub(crate) fn force_framebuffer_status(&self, status: u32) {
        self.state.borrow_mut().forced_status = Some(status);
    }

    /// How many times the blend flag actually changed value.
    pub(crate) fn blend_toggles(&self) -> usize {
        self.state.borrow().blend_toggles
    }

    pub(crate) fn blend_enabled(&self) -> bool {
        self.state.borrow().caps.contains(&glow::BLEND)
    }

    pub(crate) fn blend_func_pair(&self) -> (u32, u32) {
        self.state.borrow().blend_func
    }

    pub(crate) fn depth_writes(&self) -> bool {
        self.state.borrow().depth_mask
    }

    pub(crate) fn bound_framebuffer(&self) -> Option<u32> {
        self.state.borrow().framebuffer
    }

    pub(crate) fn draw_buffers_selected(&self) -> Vec<u32> {
        self.state.borrow().draw_buffers.clone()
    }

    pub(crate) fn draw_count(&self) -> usize {
        self.state.borrow().draws
    }

    pub(crate) fn tex_parameter(&self, texture: u32, parameter: u32) -> Option<i32> {
        self.state.borrow().textures.get(&texture)?.params.get(&parameter).copied()
    }

    /// Raw stored bytes of one texel; row 0 is the first uploaded row.
    pub(crate) fn texel(&self, texture: u32, x: usize, y: usize) -> Vec<u8> {
        let state = self.state.borrow();
        let image = state.textures[&texture].image.as_ref().expect("texture has no storage");
        image.texel(x, y).to_vec()
    }

    /// Texel expanded to RGBA the way a sampler would see it.
    pub(crate) fn pixel(&self, texture: u32, x: usize, y: usize) -> [u8; 4] {
        let state = self.state.borrow();
        let image = state.textures[&texture].image.as_ref().expect("texture has no storage");
        image.rgba(x, y).map(|c| (c * 255.0).round() as u8)
    }

    /// Default framebuffer pixel; row 0 is the bottom row.
    pub(crate) fn surface_pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let state = self.state.borrow();
        let t = state.surface.texel(x, y);
        [t[0], t[1], t[2], t[3]]
    }
}

// ── backend ───────────────────────────────────────────────────────────────

impl GlBackend for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type Framebuffer = u32;
    type UniformLocation = FakeUniform;

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        if shader_type != glow::VERTEX_SHADER && shader_type != glow::FRAGMENT_SHADER {
            return Err(format!("invalid shader type 0x{shader_type:04x}"));
        }
        let mut s = self.state.borrow_mut();
        let id = s.id();
        s.shaders.insert(
            id,
            Shader { kind: shader_type, source: String::new(), compiled: false, log: String::new() },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.compiled = s.source.contains("void main()");
            s.log = if s.compiled {
                String::new()
            } else {
                "0:1(1): error: entry point `main` not found".to_string()
            };
        }
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn get_shader_info_log(&self, shader: u32) -> String {
        self.state.borrow().shaders.get(&shader).map(|s| s.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.allocate(FakeObject::Program)?;
        s.programs.insert(id, Program::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        self.state.borrow_mut().link(program);
    }

    fn get_program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn get_program_info_log(&self, program: u32) -> String {
        self.state.borrow().programs.get(&program).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        let mut s = self.state.borrow_mut();
        match program {
            Some(p) if !s.programs.get(&p).is_some_and(|p| p.linked) => {
                s.raise(glow::INVALID_OPERATION)
            }
            _ => s.current_program = program,
        }
    }

    fn get_attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let s = self.state.borrow();
        let p = s.programs.get(&program).filter(|p| p.linked)?;
        p.attributes.iter().position(|a| a == name).map(|i| i as u32)
    }

    fn get_uniform_location(&self, program: u32, name: &str) -> Option<FakeUniform> {
        let s = self.state.borrow();
        let p = s.programs.get(&program).filter(|p| p.linked)?;
        let index = p.uniforms.iter().position(|u| u == name)?;
        Some(FakeUniform { program, index })
    }

    fn uniform_1_i32(&self, location: Option<&FakeUniform>, x: i32) {
        self.state.borrow_mut().set_uniform(location, vec![x as f32]);
    }

    fn uniform_1_f32(&self, location: Option<&FakeUniform>, x: f32) {
        self.state.borrow_mut().set_uniform(location, vec![x]);
    }

    fn uniform_2_f32_slice(&self, location: Option<&FakeUniform>, v: &[f32]) {
        self.state.borrow_mut().set_uniform(location, v.to_vec());
    }

    fn uniform_4_f32(&self, location: Option<&FakeUniform>, x: f32, y: f32, z: f32, w: f32) {
        self.state.borrow_mut().set_uniform(location, vec![x, y, z, w]);
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.allocate(FakeObject::Buffer)?;
        s.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        let mut s = self.state.borrow_mut();
        if target == glow::ARRAY_BUFFER {
            s.array_buffer = buffer;
        }
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], _usage: u32) {
        let mut s = self.state.borrow_mut();
        match s.array_buffer.filter(|_| target == glow::ARRAY_BUFFER) {
            Some(b) => {
                s.buffers.insert(b, data.to_vec());
            }
            None => s.raise(glow::INVALID_OPERATION),
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut s = self.state.borrow_mut();
        s.buffers.remove(&buffer);
        if s.array_buffer == Some(buffer) {
            s.array_buffer = None;
        }
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.allocate(FakeObject::VertexArray)?;
        s.vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut s = self.state.borrow_mut();
        s.vertex_arrays.remove(&vertex_array);
        if s.vertex_array == Some(vertex_array) {
            s.vertex_array = None;
        }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        _size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        let mut s = self.state.borrow_mut();
        match s.array_buffer {
            Some(buffer) => {
                let pointer = AttribPointer {
                    buffer,
                    stride: stride as usize,
                    offset: offset as usize,
                };
                s.attribs.insert(index, pointer);
            }
            None => s.raise(glow::INVALID_OPERATION),
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled_attribs.insert(index);
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        let mut s = self.state.borrow_mut();
        s.draws += 1;
        assert_eq!((mode, count), (glow::TRIANGLE_FAN, 4), "only quad fans are emulated");
        s.rasterize(first as usize);
    }

    fn enable(&self, cap: u32) {
        let mut s = self.state.borrow_mut();
        if s.caps.insert(cap) && cap == glow::BLEND {
            s.blend_toggles += 1;
        }
    }

    fn disable(&self, cap: u32) {
        let mut s = self.state.borrow_mut();
        if s.caps.remove(&cap) && cap == glow::BLEND {
            s.blend_toggles += 1;
        }
    }

    fn is_enabled(&self, cap: u32) -> bool {
        self.state.borrow().caps.contains(&cap)
    }

    fn depth_mask(&self, flag: bool) {
        self.state.borrow_mut().depth_mask = flag;
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.state.borrow_mut().blend_func = (src, dst);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut s = self.state.borrow_mut();
        if width < 0 || height < 0 {
            s.raise(glow::INVALID_VALUE);
            return;
        }
        s.viewport = [x, y, width, height];
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.state.borrow_mut().clear_color = [r, g, b, a];
    }

    fn clear(&self, mask: u32) {
        let mut s = self.state.borrow_mut();
        if mask & glow::COLOR_BUFFER_BIT == 0 {
            return;
        }
        let color = s.clear_color;
        if let Some(target) = s.target_mut() {
            target.fill(color);
        }
    }

    fn get_parameter_i32(&self, parameter: u32) -> i32 {
        match parameter {
            glow::MAX_TEXTURE_SIZE => MAX_TEXTURE_SIZE,
            _ => 0,
        }
    }

    fn get_parameter_i32_slice(&self, parameter: u32, out: &mut [i32]) {
        let s = self.state.borrow();
        if parameter == glow::VIEWPORT {
            for (o, v) in out.iter_mut().zip(s.viewport) {
                *o = v;
            }
        }
    }

    fn get_parameter_framebuffer(&self, parameter: u32) -> Option<u32> {
        // Core profiles query the draw binding, ES 2 the combined one. Reads
        // and draws always share one target here.
        if parameter == glow::FRAMEBUFFER_BINDING || parameter == glow::DRAW_FRAMEBUFFER_BINDING {
            self.state.borrow().framebuffer
        } else {
            None
        }
    }

    fn get_error(&self) -> u32 {
        let mut s = self.state.borrow_mut();
        if s.errors.is_empty() {
            glow::NO_ERROR
        } else {
            s.errors.remove(0)
        }
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.allocate(FakeObject::Texture)?;
        s.textures.insert(id, Texture::default());
        Ok(id)
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit - glow::TEXTURE0;
    }

    fn bind_texture(&self, _target: u32, texture: Option<u32>) {
        let mut s = self.state.borrow_mut();
        let unit = s.active_unit;
        match texture {
            Some(t) => s.bound_textures.insert(unit, t),
            None => s.bound_textures.remove(&unit),
        };
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        let mut s = self.state.borrow_mut();
        let Some(tex) = s.bound_texture() else {
            s.raise(glow::INVALID_OPERATION);
            return;
        };
        if let Some(t) = s.textures.get_mut(&tex) {
            t.params.insert(parameter, value);
        }
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        let mut s = self.state.borrow_mut();
        if parameter != glow::UNPACK_ALIGNMENT {
            return;
        }
        match value {
            1 | 2 | 4 | 8 => s.unpack_alignment = value as usize,
            _ => s.raise(glow::INVALID_VALUE),
        }
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        _internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        _ty: u32,
        pixels: Option<&[u8]>,
    ) {
        self.state.borrow_mut().upload(width, height, format, pixels);
    }

    fn delete_texture(&self, texture: u32) {
        let mut s = self.state.borrow_mut();
        s.textures.remove(&texture);
        s.bound_textures.retain(|_, t| *t != texture);
    }

    fn create_framebuffer(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.allocate(FakeObject::Framebuffer)?;
        s.framebuffers.insert(id, None);
        Ok(id)
    }

    fn bind_framebuffer(&self, _target: u32, framebuffer: Option<u32>) {
        self.state.borrow_mut().framebuffer = framebuffer;
    }

    fn framebuffer_texture_2d(
        &self,
        _target: u32,
        attachment: u32,
        _texture_target: u32,
        texture: Option<u32>,
        _level: i32,
    ) {
        let mut s = self.state.borrow_mut();
        let Some(fb) = s.framebuffer.filter(|_| attachment == glow::COLOR_ATTACHMENT0) else {
            s.raise(glow::INVALID_OPERATION);
            return;
        };
        s.framebuffers.insert(fb, texture);
    }

    fn check_framebuffer_status(&self, _target: u32) -> u32 {
        let mut s = self.state.borrow_mut();
        if let Some(status) = s.forced_status.take() {
            return status;
        }
        let Some(fb) = s.framebuffer else {
            return glow::FRAMEBUFFER_COMPLETE;
        };
        let attached = s.framebuffers.get(&fb).copied().flatten();
        match attached.and_then(|t| s.textures.get(&t)) {
            Some(t) if t.image.is_some() => glow::FRAMEBUFFER_COMPLETE,
            Some(_) => glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
            None => glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
        }
    }

    fn draw_buffers(&self, buffers: &[u32]) {
        self.state.borrow_mut().draw_buffers = buffers.to_vec();
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        let mut s = self.state.borrow_mut();
        s.framebuffers.remove(&framebuffer);
        if s.framebuffer == Some(framebuffer) {
            s.framebuffer = None;
        }
    }
}

// ── log capture ───────────────────────────────────────────────────────────

type Captured = Vec<(log::Level, String)>;

thread_local! {
    static RECORDS: RefCell<Option<Captured>> = const { RefCell::new(None) };
}

/// Global logger that keeps records per test thread, and only while a
/// [`capture_logs`] call on that thread is running.
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let line = record.args().to_string();
        RECORDS.with(|r| {
            if let Some(records) = r.borrow_mut().as_mut() {
                records.push((record.level(), line));
            }
        });
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Claims the global logger for the test binary. Every test that touches the
/// global logger calls this first, so nothing else can claim it before.
pub(crate) fn install_log_capture() {
    INSTALL.call_once(|| {
        if log::set_logger(&CAPTURE).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
}

/// Runs `f` and returns its result with every record logged on this thread
/// meanwhile.
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Captured) {
    install_log_capture();
    RECORDS.with(|r| *r.borrow_mut() = Some(Vec::new()));
    let out = f();
    let records = RECORDS.with(|r| r.borrow_mut().take()).unwrap_or_default();
    (out, records)
}

/// Error-level messages among `records`.
pub(crate) fn errors(records: &[(log::Level, String)]) -> Vec<&str> {
    records
        .iter()
        .filter(|(level, _)| *level == log::Level::Error)
        .map(|(_, line)| line.as_str())
        .collect()
}
