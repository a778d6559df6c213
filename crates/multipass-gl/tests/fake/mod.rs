//! Recording in-memory graphics context.
//!
//! `FakeGl` models just enough of a GL context to drive the compositor:
//! object tables, the full binding state the state guard touches, and a log
//! of uniform writes and draw calls. Handles are plain `u32`s from one
//! shared counter, so no handle is ever reused across object kinds.
//!
//! Shader sources containing [`COMPILE_FAIL`] fail to compile; programs with
//! an attached source containing [`LINK_FAIL`] fail to link. Uniform and
//! attribute lookups succeed when the name occurs in any attached source,
//! which mirrors how linkers discard unreferenced uniforms.

// Shared by several test binaries, each using a subset of the helpers.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use multipass_gl::{GlContext, MAX_TEXTURE_UNITS, ShaderStage, UniformData};

pub const COMPILE_FAIL: &str = "COMPILE_FAIL";
pub const LINK_FAIL: &str = "LINK_FAIL";

/// Everything the state guard is expected to preserve.
#[derive(Debug, Clone, PartialEq)]
pub struct Ambient {
    pub draw_framebuffer: Option<u32>,
    pub viewport: [i32; 4],
    pub clear_color: [f32; 4],
    pub depth_write: bool,
    pub program: Option<u32>,
    pub active_unit: u32,
    pub unit_bindings: Vec<Option<u32>>,
    pub vertex_array: Option<u32>,
    pub array_buffer: Option<u32>,
}

/// Snapshot of the context at one `draw_triangle_strip` call.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub framebuffer: Option<u32>,
    pub draw_buffers: Vec<u32>,
    pub attachments: BTreeMap<u32, u32>,
    pub viewport: [i32; 4],
    pub clear_color: [f32; 4],
    pub program: Option<u32>,
    pub depth_write: bool,
    pub unit_bindings: Vec<Option<u32>>,
    pub vertex_array: Option<u32>,
    pub array_buffer: Option<u32>,
}

struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled_ok: bool,
}

#[derive(Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    linked_ok: bool,
}

#[derive(Default)]
struct FramebufferRecord {
    attachments: BTreeMap<u32, u32>,
    draw_buffers: Vec<u32>,
}

struct State {
    next_id: u32,
    shaders: HashMap<u32, ShaderRecord>,
    programs: HashMap<u32, ProgramRecord>,
    framebuffers: HashMap<u32, FramebufferRecord>,
    buffers: HashSet<u32>,
    vertex_arrays: HashSet<u32>,
    textures: HashSet<u32>,

    draw_framebuffer: Option<u32>,
    program_in_use: Option<u32>,
    active_unit: u32,
    unit_bindings: Vec<Option<u32>>,
    vertex_array: Option<u32>,
    array_buffer: Option<u32>,
    viewport: [i32; 4],
    clear_color: [f32; 4],
    depth_write: bool,

    uniform_writes: Vec<(u32, String, UniformData)>,
    draws: Vec<DrawCall>,
}

impl State {
    fn new() -> Self {
        Self {
            next_id: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            framebuffers: HashMap::new(),
            buffers: HashSet::new(),
            vertex_arrays: HashSet::new(),
            textures: HashSet::new(),
            draw_framebuffer: None,
            program_in_use: None,
            active_unit: 0,
            unit_bindings: vec![None; MAX_TEXTURE_UNITS as usize],
            vertex_array: None,
            array_buffer: None,
            viewport: [0, 0, 0, 0],
            clear_color: [0.0, 0.0, 0.0, 0.0],
            // GL default: depth writes enabled.
            depth_write: true,
            uniform_writes: Vec::new(),
            draws: Vec::new(),
        }
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn program_sources_contain(&self, program: u32, needle: &str) -> bool {
        self.programs
            .get(&program)
            .map(|record| {
                record.attached.iter().any(|shader| {
                    self.shaders
                        .get(shader)
                        .is_some_and(|s| s.source.contains(needle))
                })
            })
            .unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct FakeGl {
    state: Rc<RefCell<State>>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State::new())),
        }
    }

    /// Allocates a texture handle; the compositor only ever borrows these.
    pub fn new_texture(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.textures.insert(id);
        id
    }

    pub fn ambient(&self) -> Ambient {
        let state = self.state.borrow();
        Ambient {
            draw_framebuffer: state.draw_framebuffer,
            viewport: state.viewport,
            clear_color: state.clear_color,
            depth_write: state.depth_write,
            program: state.program_in_use,
            active_unit: state.active_unit,
            unit_bindings: state.unit_bindings.clone(),
            vertex_array: state.vertex_array,
            array_buffer: state.array_buffer,
        }
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn uniform_writes(&self) -> Vec<(u32, String, UniformData)> {
        self.state.borrow().uniform_writes.clone()
    }

    /// Value most recently written to uniform `name`, across all programs.
    pub fn uniform_value(&self, name: &str) -> Option<UniformData> {
        self.state
            .borrow()
            .uniform_writes
            .iter()
            .rev()
            .find(|(_, written, _)| written == name)
            .map(|(_, _, value)| *value)
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }
}

impl GlContext for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Framebuffer = u32;
    type Texture = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = (u32, String);

    fn create_shader(&self, stage: ShaderStage) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.shaders.insert(
            id,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled_ok: false,
            },
        );
        id
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: u32) -> bool {
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(record) => {
                record.compiled_ok = !record.source.contains(COMPILE_FAIL);
                record.compiled_ok
            }
            None => false,
        }
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let state = self.state.borrow();
        match state.shaders.get(&shader) {
            Some(record) if !record.compiled_ok => {
                format!("{:?} stage failed to compile", record.stage)
            }
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.programs.insert(id, ProgramRecord::default());
        id
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.attached.retain(|attached| *attached != shader);
        }
    }

    fn link_program(&self, program: u32) -> bool {
        let linked_ok = {
            let state = self.state.borrow();
            let compiled = state.programs.get(&program).is_some_and(|record| {
                record
                    .attached
                    .iter()
                    .all(|shader| state.shaders.get(shader).is_some_and(|s| s.compiled_ok))
            });
            compiled && !state.program_sources_contain(program, LINK_FAIL)
        };
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.linked_ok = linked_ok;
        }
        linked_ok
    }

    fn program_info_log(&self, program: u32) -> String {
        let state = self.state.borrow();
        match state.programs.get(&program) {
            Some(record) if !record.linked_ok => "program failed to link".to_owned(),
            _ => String::new(),
        }
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().program_in_use = program;
    }

    fn current_program(&self) -> Option<u32> {
        self.state.borrow().program_in_use
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<(u32, String)> {
        self.state
            .borrow()
            .program_sources_contain(program, name)
            .then(|| (program, name.to_owned()))
    }

    fn set_uniform(&self, location: &(u32, String), value: UniformData) {
        self.state
            .borrow_mut()
            .uniform_writes
            .push((location.0, location.1.clone(), value));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        self.state
            .borrow()
            .program_sources_contain(program, name)
            .then_some(0)
    }

    fn vertex_attrib_pointer_f32(&self, _index: u32, _components: i32) {}

    fn enable_vertex_attrib_array(&self, _index: u32) {}

    fn create_framebuffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.framebuffers.insert(id, FramebufferRecord::default());
        id
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.state.borrow_mut().framebuffers.remove(&framebuffer);
    }

    fn bind_draw_framebuffer(&self, framebuffer: Option<u32>) {
        self.state.borrow_mut().draw_framebuffer = framebuffer;
    }

    fn draw_framebuffer_binding(&self) -> Option<u32> {
        self.state.borrow().draw_framebuffer
    }

    fn framebuffer_color_texture(&self, channel: u32, texture: Option<u32>) {
        let mut state = self.state.borrow_mut();
        let Some(bound) = state.draw_framebuffer else {
            return;
        };
        if let Some(record) = state.framebuffers.get_mut(&bound) {
            match texture {
                Some(texture) => {
                    record.attachments.insert(channel, texture);
                }
                None => {
                    record.attachments.remove(&channel);
                }
            }
        }
    }

    fn draw_buffers(&self, channels: &[u32]) {
        let mut state = self.state.borrow_mut();
        let Some(bound) = state.draw_framebuffer else {
            return;
        };
        if let Some(record) = state.framebuffers.get_mut(&bound) {
            record.draw_buffers = channels.to_vec();
        }
    }

    fn create_buffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.buffers.insert(id);
        id
    }

    fn delete_buffer(&self, buffer: u32) {
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.state.borrow_mut().array_buffer = buffer;
    }

    fn array_buffer_binding(&self) -> Option<u32> {
        self.state.borrow().array_buffer
    }

    fn array_buffer_data(&self, _data: &[u8]) {}

    fn create_vertex_array(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.vertex_arrays.insert(id);
        id
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().vertex_array = vertex_array;
    }

    fn vertex_array_binding(&self) -> Option<u32> {
        self.state.borrow().vertex_array
    }

    fn set_active_texture_unit(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn active_texture_unit(&self) -> u32 {
        self.state.borrow().active_unit
    }

    fn bind_texture_2d(&self, texture: Option<u32>) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit as usize;
        state.unit_bindings[unit] = texture;
    }

    fn texture_binding_2d(&self) -> Option<u32> {
        let state = self.state.borrow();
        state.unit_bindings[state.active_unit as usize]
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = [x, y, width, height];
    }

    fn viewport(&self) -> [i32; 4] {
        self.state.borrow().viewport
    }

    fn set_clear_color(&self, color: [f32; 4]) {
        self.state.borrow_mut().clear_color = color;
    }

    fn clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    fn set_depth_write(&self, enabled: bool) {
        self.state.borrow_mut().depth_write = enabled;
    }

    fn depth_write(&self) -> bool {
        self.state.borrow().depth_write
    }

    fn clear_color_buffer(&self) {}

    fn draw_triangle_strip(&self, _first: i32, _count: i32) {
        let mut state = self.state.borrow_mut();
        let attachments = state
            .draw_framebuffer
            .and_then(|fbo| state.framebuffers.get(&fbo))
            .map(|record| record.attachments.clone())
            .unwrap_or_default();
        let draw_buffers = state
            .draw_framebuffer
            .and_then(|fbo| state.framebuffers.get(&fbo))
            .map(|record| record.draw_buffers.clone())
            .unwrap_or_default();
        let call = DrawCall {
            framebuffer: state.draw_framebuffer,
            draw_buffers,
            attachments,
            viewport: state.viewport,
            clear_color: state.clear_color,
            program: state.program_in_use,
            depth_write: state.depth_write,
            unit_bindings: state.unit_bindings.clone(),
            vertex_array: state.vertex_array,
            array_buffer: state.array_buffer,
        };
        state.draws.push(call);
    }
}
