//! Graphics capability interface
//!
//! The compositor never talks to a concrete graphics API. Everything it needs
//! — shader and program lifecycle, framebuffer color attachments, texture-unit
//! binding, fixed-function state queries, and the full-screen draw — goes
//! through [`GlContext`]. The trait is shaped after `glow::HasContext`: opaque
//! associated handle types and `&self` methods, so a real GL context, and a
//! recording fake for tests, both fit behind it.
//!
//! The compositor owns and releases the framebuffers and shader objects it
//! creates through this interface. Texture handles are only ever borrowed:
//! the compositor records and binds them but never creates or deletes them.

use std::fmt;

/// Number of texture units captured and restored by the state guard.
pub const MAX_TEXTURE_UNITS: u32 = 32;

/// Number of color channels a pass may write to in one draw (MRT limit).
pub const MAX_OUTPUT_CHANNELS: u32 = 16;

/// The two shader stages the compositor creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// The shared full-screen-quad vertex stage.
    Vertex,
    /// A per-pass fragment stage.
    Fragment,
}

/// A uniform value in any of the supported shapes: 1–4 components,
/// float / signed / unsigned.
///
/// `From` impls cover scalars, tuples, and fixed arrays, so
/// [`Compositor::set_uniform`](crate::Compositor::set_uniform) accepts e.g.
/// `1.0f32`, `(0.5, 0.5)`, or `[1u32, 2, 3, 4]` directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformData {
    F1(f32),
    F2([f32; 2]),
    F3([f32; 3]),
    F4([f32; 4]),
    I1(i32),
    I2([i32; 2]),
    I3([i32; 3]),
    I4([i32; 4]),
    U1(u32),
    U2([u32; 2]),
    U3([u32; 3]),
    U4([u32; 4]),
}

macro_rules! uniform_from {
    ($($variant:ident: $ty:ty => $map:expr;)*) => {
        $(impl From<$ty> for UniformData {
            fn from(value: $ty) -> Self {
                UniformData::$variant($map(value))
            }
        })*
    };
}

uniform_from! {
    F1: f32 => |v| v;
    F2: (f32, f32) => |v: (f32, f32)| [v.0, v.1];
    F3: (f32, f32, f32) => |v: (f32, f32, f32)| [v.0, v.1, v.2];
    F4: (f32, f32, f32, f32) => |v: (f32, f32, f32, f32)| [v.0, v.1, v.2, v.3];
    F2: [f32; 2] => |v| v;
    F3: [f32; 3] => |v| v;
    F4: [f32; 4] => |v| v;
    I1: i32 => |v| v;
    I2: (i32, i32) => |v: (i32, i32)| [v.0, v.1];
    I3: (i32, i32, i32) => |v: (i32, i32, i32)| [v.0, v.1, v.2];
    I4: (i32, i32, i32, i32) => |v: (i32, i32, i32, i32)| [v.0, v.1, v.2, v.3];
    I2: [i32; 2] => |v| v;
    I3: [i32; 3] => |v| v;
    I4: [i32; 4] => |v| v;
    U1: u32 => |v| v;
    U2: (u32, u32) => |v: (u32, u32)| [v.0, v.1];
    U3: (u32, u32, u32) => |v: (u32, u32, u32)| [v.0, v.1, v.2];
    U4: (u32, u32, u32, u32) => |v: (u32, u32, u32, u32)| [v.0, v.1, v.2, v.3];
    U2: [u32; 2] => |v| v;
    U3: [u32; 3] => |v| v;
    U4: [u32; 4] => |v| v;
}

/// The set of graphics operations the compositor depends on.
///
/// Implementations must be context-current at call time; the compositor does
/// not manage context creation. All methods take `&self` — a GL context is a
/// handle to external mutable state, and this matches how `glow` exposes it.
///
/// Object creation is treated as infallible: running out of GPU handles is a
/// fatal external condition, not a recoverable compositor error.
pub trait GlContext {
    type Shader: Copy + Eq + fmt::Debug;
    type Program: Copy + Eq + fmt::Debug;
    type Framebuffer: Copy + Eq + fmt::Debug;
    type Texture: Copy + Eq + fmt::Debug;
    type Buffer: Copy + Eq + fmt::Debug;
    type VertexArray: Copy + Eq + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    // Shader objects.
    fn create_shader(&self, stage: ShaderStage) -> Self::Shader;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    /// Compiles the shader and returns the compile status.
    fn compile_shader(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // Program objects.
    fn create_program(&self) -> Self::Program;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Links the program and returns the link status.
    fn link_program(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);
    fn current_program(&self) -> Option<Self::Program>;

    // Uniforms and vertex attributes.
    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformData);
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    /// Points the attribute at the bound array buffer: `components` floats,
    /// tightly packed, not normalized.
    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32);
    fn enable_vertex_attrib_array(&self, index: u32);

    // Framebuffers and draw targets.
    fn create_framebuffer(&self) -> Self::Framebuffer;
    fn delete_framebuffer(&self, framebuffer: Self::Framebuffer);
    fn bind_draw_framebuffer(&self, framebuffer: Option<Self::Framebuffer>);
    fn draw_framebuffer_binding(&self) -> Option<Self::Framebuffer>;
    /// Attaches `texture` (or detaches, for `None`) at color attachment
    /// `channel` of the currently bound draw framebuffer.
    fn framebuffer_color_texture(&self, channel: u32, texture: Option<Self::Texture>);
    /// Sets the draw-buffer list of the bound draw framebuffer to the given
    /// color channels.
    fn draw_buffers(&self, channels: &[u32]);

    // Vertex geometry.
    fn create_buffer(&self) -> Self::Buffer;
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    fn array_buffer_binding(&self) -> Option<Self::Buffer>;
    fn array_buffer_data(&self, data: &[u8]);
    fn create_vertex_array(&self) -> Self::VertexArray;
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn vertex_array_binding(&self) -> Option<Self::VertexArray>;

    // Texture units.
    fn set_active_texture_unit(&self, unit: u32);
    fn active_texture_unit(&self) -> u32;
    fn bind_texture_2d(&self, texture: Option<Self::Texture>);
    fn texture_binding_2d(&self) -> Option<Self::Texture>;

    // Fixed-function state, settable and queryable for the state guard.
    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn viewport(&self) -> [i32; 4];
    fn set_clear_color(&self, color: [f32; 4]);
    fn clear_color(&self) -> [f32; 4];
    fn set_depth_write(&self, enabled: bool);
    fn depth_write(&self) -> bool;
    fn clear_color_buffer(&self);

    // Draws.
    fn draw_triangle_strip(&self, first: i32, count: i32);
}
