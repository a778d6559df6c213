//! Shader building and shared full-screen geometry
//!
//! All passes draw the same unit quad through the same vertex stage; only the
//! fragment stage differs per pass. The vertex stage is compiled once when the
//! compositor is constructed, and every pass program links against it.
//!
//! Building a program is a multi-step acquisition that can fail midway; each
//! failure path deletes whatever was created before returning, so a failed
//! load never leaks a stage or program.

use log::warn;

use crate::context::{GlContext, ShaderStage};
use crate::error::{CompositorError, Result};

/// Name of the single vertex input attribute every pass program exposes.
const POSITION_ATTRIBUTE: &str = "position";

/// Maps the unit quad to full clip-space coverage and forwards the quad
/// coordinate as `UV`.
const VERTEX_SHADER_SOURCE: &str = "\
#version 330 core
in vec3 position;
out vec2 UV;
void main() {
    gl_Position = vec4(position.xy * 2.0 - 1.0, -position.z, 1.0);
    UV = position.xy;
}
";

/// Unit quad in triangle-strip order, three floats per vertex.
const QUAD_VERTICES: [f32; 12] = [
    0.0, 0.0, 0.0, //
    1.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, //
    1.0, 1.0, 0.0, //
];

/// The vertex stage and quad geometry shared by every pass.
pub(crate) struct SharedGeometry<G: GlContext> {
    pub(crate) vertex_stage: G::Shader,
    pub(crate) vertex_array: G::VertexArray,
    pub(crate) vertex_buffer: G::Buffer,
}

impl<G: GlContext> SharedGeometry<G> {
    /// Compiles the shared vertex stage and uploads the quad, leaving the
    /// caller's vertex-array and array-buffer bindings untouched.
    pub(crate) fn new(gl: &G) -> Self {
        let vertex_stage = gl.create_shader(ShaderStage::Vertex);
        gl.shader_source(vertex_stage, VERTEX_SHADER_SOURCE);
        if !gl.compile_shader(vertex_stage) {
            // Recoverable: every per-pass link will report ShaderLinkingFail.
            warn!(
                "shared vertex stage failed to compile: {}",
                gl.shader_info_log(vertex_stage)
            );
        }

        let previous_array = gl.vertex_array_binding();
        let previous_buffer = gl.array_buffer_binding();

        let vertex_array = gl.create_vertex_array();
        gl.bind_vertex_array(Some(vertex_array));
        let vertex_buffer = gl.create_buffer();
        gl.bind_array_buffer(Some(vertex_buffer));
        gl.array_buffer_data(bytemuck::cast_slice(&QUAD_VERTICES));

        gl.bind_vertex_array(previous_array);
        gl.bind_array_buffer(previous_buffer);

        Self {
            vertex_stage,
            vertex_array,
            vertex_buffer,
        }
    }

    /// Compiles `fragment_source` and links it against the shared vertex
    /// stage.
    ///
    /// # Returns
    /// The new fragment stage and linked program, ready for attribute binding.
    pub(crate) fn build_program(
        &self,
        gl: &G,
        fragment_source: &str,
    ) -> Result<(G::Shader, G::Program)> {
        let stage = gl.create_shader(ShaderStage::Fragment);
        gl.shader_source(stage, fragment_source);
        if !gl.compile_shader(stage) {
            let log = gl.shader_info_log(stage);
            gl.delete_shader(stage);
            return Err(CompositorError::ShaderCompileFail { log });
        }

        let program = gl.create_program();
        gl.attach_shader(program, self.vertex_stage);
        gl.attach_shader(program, stage);
        if !gl.link_program(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(stage);
            return Err(CompositorError::ShaderLinkingFail { log });
        }

        Ok((stage, program))
    }

    /// (Re)establishes the `position` attribute of `program` against the
    /// shared quad buffer, preserving whatever vertex-array and array-buffer
    /// bindings were active before this step.
    pub(crate) fn bind_position_attribute(&self, gl: &G, program: G::Program) {
        let previous_array = gl.vertex_array_binding();
        let previous_buffer = gl.array_buffer_binding();

        gl.bind_vertex_array(Some(self.vertex_array));
        gl.bind_array_buffer(Some(self.vertex_buffer));

        if let Some(index) = gl.attrib_location(program, POSITION_ATTRIBUTE) {
            gl.vertex_attrib_pointer_f32(index, 3);
            gl.enable_vertex_attrib_array(index);
        }

        gl.bind_vertex_array(previous_array);
        gl.bind_array_buffer(previous_buffer);
    }

    /// Deletes the shared resources. Called from the compositor's `Drop`.
    pub(crate) fn release(&self, gl: &G) {
        gl.delete_shader(self.vertex_stage);
        gl.delete_buffer(self.vertex_buffer);
        gl.delete_vertex_array(self.vertex_array);
    }
}
