//! Ambient graphics-state guard
//!
//! The host application's graphics state must survive compositor renders
//! untouched. [`StateSnapshot::capture`] reads every piece of ambient state
//! the render executor mutates; [`StateSnapshot::restore`] writes it all back
//! in capture order, including the bound texture of every texture unit.
//!
//! Each public render entry point brackets its work with exactly one
//! capture/restore pair. Nested renders are not supported at this layer;
//! callers must serialize.

use crate::context::{GlContext, MAX_TEXTURE_UNITS};

/// A snapshot of the ambient graphics state, taken immediately before a
/// render and consumed immediately after. Never persisted.
pub(crate) struct StateSnapshot<G: GlContext> {
    draw_framebuffer: Option<G::Framebuffer>,
    viewport: [i32; 4],
    clear_color: [f32; 4],
    depth_write: bool,
    program: Option<G::Program>,
    active_unit: u32,
    unit_bindings: Vec<Option<G::Texture>>,
    vertex_array: Option<G::VertexArray>,
    array_buffer: Option<G::Buffer>,
}

impl<G: GlContext> StateSnapshot<G> {
    /// Reads every guarded state field from the context.
    pub(crate) fn capture(gl: &G) -> Self {
        let draw_framebuffer = gl.draw_framebuffer_binding();
        let viewport = gl.viewport();
        let clear_color = gl.clear_color();
        let depth_write = gl.depth_write();
        let program = gl.current_program();
        let active_unit = gl.active_texture_unit();

        let mut unit_bindings = Vec::with_capacity(MAX_TEXTURE_UNITS as usize);
        for unit in 0..MAX_TEXTURE_UNITS {
            gl.set_active_texture_unit(unit);
            unit_bindings.push(gl.texture_binding_2d());
        }

        let vertex_array = gl.vertex_array_binding();
        let array_buffer = gl.array_buffer_binding();

        Self {
            draw_framebuffer,
            viewport,
            clear_color,
            depth_write,
            program,
            active_unit,
            unit_bindings,
            vertex_array,
            array_buffer,
        }
    }

    /// Writes every captured field back, in capture order. The per-unit loop
    /// leaves the active unit dirty, so the captured active unit is restored
    /// after it.
    pub(crate) fn restore(self, gl: &G) {
        gl.bind_draw_framebuffer(self.draw_framebuffer);
        gl.set_viewport(
            self.viewport[0],
            self.viewport[1],
            self.viewport[2],
            self.viewport[3],
        );
        gl.set_clear_color(self.clear_color);
        gl.set_depth_write(self.depth_write);

        for (unit, texture) in self.unit_bindings.into_iter().enumerate() {
            gl.set_active_texture_unit(unit as u32);
            gl.bind_texture_2d(texture);
        }

        gl.set_active_texture_unit(self.active_unit);
        gl.use_program(self.program);
        gl.bind_vertex_array(self.vertex_array);
        gl.bind_array_buffer(self.array_buffer);
    }
}
