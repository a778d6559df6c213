//! [`GlContext`] backed by a real OpenGL context via `glow`
//!
//! Enabled with the `glow` feature. The context must be current on the
//! calling thread for every method; `glow` carries no context management of
//! its own and neither does this impl.
//!
//! Binding and fixed-function queries go through `glGetInteger`-style
//! parameter reads, with raw names rebuilt into `glow` handles (zero means
//! "nothing bound").

use std::num::NonZeroU32;

use glow::HasContext;

use crate::context::{GlContext, ShaderStage, UniformData};

fn framebuffer_from_raw(raw: i32) -> Option<glow::NativeFramebuffer> {
    NonZeroU32::new(raw as u32).map(glow::NativeFramebuffer)
}

fn program_from_raw(raw: i32) -> Option<glow::NativeProgram> {
    NonZeroU32::new(raw as u32).map(glow::NativeProgram)
}

fn texture_from_raw(raw: i32) -> Option<glow::NativeTexture> {
    NonZeroU32::new(raw as u32).map(glow::NativeTexture)
}

fn buffer_from_raw(raw: i32) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(raw as u32).map(glow::NativeBuffer)
}

fn vertex_array_from_raw(raw: i32) -> Option<glow::NativeVertexArray> {
    NonZeroU32::new(raw as u32).map(glow::NativeVertexArray)
}

impl GlContext for glow::Context {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Framebuffer = glow::NativeFramebuffer;
    type Texture = glow::NativeTexture;
    type Buffer = glow::NativeBuffer;
    type VertexArray = glow::NativeVertexArray;
    type UniformLocation = glow::NativeUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Self::Shader {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { HasContext::create_shader(self, kind) }.expect("shader allocation failed")
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) -> bool {
        unsafe {
            HasContext::compile_shader(self, shader);
            self.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Self::Program {
        unsafe { HasContext::create_program(self) }.expect("program allocation failed")
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> bool {
        unsafe {
            HasContext::link_program(self, program);
            self.get_program_link_status(program)
        }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn current_program(&self) -> Option<Self::Program> {
        program_from_raw(unsafe { self.get_parameter_i32(glow::CURRENT_PROGRAM) })
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformData) {
        let location = Some(location);
        unsafe {
            match value {
                UniformData::F1(v) => self.uniform_1_f32(location, v),
                UniformData::F2([x, y]) => self.uniform_2_f32(location, x, y),
                UniformData::F3([x, y, z]) => self.uniform_3_f32(location, x, y, z),
                UniformData::F4([x, y, z, w]) => self.uniform_4_f32(location, x, y, z, w),
                UniformData::I1(v) => self.uniform_1_i32(location, v),
                UniformData::I2([x, y]) => self.uniform_2_i32(location, x, y),
                UniformData::I3([x, y, z]) => self.uniform_3_i32(location, x, y, z),
                UniformData::I4([x, y, z, w]) => self.uniform_4_i32(location, x, y, z, w),
                UniformData::U1(v) => self.uniform_1_u32(location, v),
                UniformData::U2([x, y]) => self.uniform_2_u32(location, x, y),
                UniformData::U3([x, y, z]) => self.uniform_3_u32(location, x, y, z),
                UniformData::U4([x, y, z, w]) => self.uniform_4_u32(location, x, y, z, w),
            }
        }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(self, index, components, glow::FLOAT, false, 0, 0)
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn create_framebuffer(&self) -> Self::Framebuffer {
        unsafe { HasContext::create_framebuffer(self) }.expect("framebuffer allocation failed")
    }

    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer) {
        unsafe { HasContext::delete_framebuffer(self, framebuffer) }
    }

    fn bind_draw_framebuffer(&self, framebuffer: Option<Self::Framebuffer>) {
        unsafe { self.bind_framebuffer(glow::DRAW_FRAMEBUFFER, framebuffer) }
    }

    fn draw_framebuffer_binding(&self) -> Option<Self::Framebuffer> {
        framebuffer_from_raw(unsafe { self.get_parameter_i32(glow::DRAW_FRAMEBUFFER_BINDING) })
    }

    fn framebuffer_color_texture(&self, channel: u32, texture: Option<Self::Texture>) {
        unsafe {
            self.framebuffer_texture_2d(
                glow::DRAW_FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0 + channel,
                glow::TEXTURE_2D,
                texture,
                0,
            )
        }
    }

    fn draw_buffers(&self, channels: &[u32]) {
        let attachments: Vec<u32> = channels
            .iter()
            .map(|channel| glow::COLOR_ATTACHMENT0 + channel)
            .collect();
        unsafe { HasContext::draw_buffers(self, &attachments) }
    }

    fn create_buffer(&self) -> Self::Buffer {
        unsafe { HasContext::create_buffer(self) }.expect("buffer allocation failed")
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn array_buffer_binding(&self) -> Option<Self::Buffer> {
        buffer_from_raw(unsafe { self.get_parameter_i32(glow::ARRAY_BUFFER_BINDING) })
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe { self.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW) }
    }

    fn create_vertex_array(&self) -> Self::VertexArray {
        unsafe { HasContext::create_vertex_array(self) }.expect("vertex array allocation failed")
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn vertex_array_binding(&self) -> Option<Self::VertexArray> {
        vertex_array_from_raw(unsafe { self.get_parameter_i32(glow::VERTEX_ARRAY_BINDING) })
    }

    fn set_active_texture_unit(&self, unit: u32) {
        unsafe { self.active_texture(glow::TEXTURE0 + unit) }
    }

    fn active_texture_unit(&self) -> u32 {
        (unsafe { self.get_parameter_i32(glow::ACTIVE_TEXTURE) } as u32) - glow::TEXTURE0
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        unsafe { self.bind_texture(glow::TEXTURE_2D, texture) }
    }

    fn texture_binding_2d(&self) -> Option<Self::Texture> {
        texture_from_raw(unsafe { self.get_parameter_i32(glow::TEXTURE_BINDING_2D) })
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    fn viewport(&self) -> [i32; 4] {
        let mut out = [0i32; 4];
        unsafe { self.get_parameter_i32_slice(glow::VIEWPORT, &mut out) };
        out
    }

    fn set_clear_color(&self, color: [f32; 4]) {
        unsafe { HasContext::clear_color(self, color[0], color[1], color[2], color[3]) }
    }

    fn clear_color(&self) -> [f32; 4] {
        let mut out = [0f32; 4];
        unsafe { self.get_parameter_f32_slice(glow::COLOR_CLEAR_VALUE, &mut out) };
        out
    }

    fn set_depth_write(&self, enabled: bool) {
        unsafe { self.depth_mask(enabled) }
    }

    fn depth_write(&self) -> bool {
        unsafe { self.get_parameter_i32(glow::DEPTH_WRITEMASK) != 0 }
    }

    fn clear_color_buffer(&self) {
        unsafe { self.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        unsafe { self.draw_arrays(glow::TRIANGLE_STRIP, first, count) }
    }
}
