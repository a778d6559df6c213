//! Uniform and texture binding
//!
//! Inputs are named sampler uniforms bound to sequential texture units in
//! insertion order; adding or removing one re-writes the unit index of every
//! remaining input. Outputs are color channels of the pass's render target,
//! drawn in ascending channel order.
//!
//! Every write that needs the pass's program active saves and restores the
//! caller's current program, and every attachment change saves and restores
//! the caller's draw-framebuffer binding.

use log::trace;

use crate::compositor::Compositor;
use crate::context::{GlContext, MAX_OUTPUT_CHANNELS, UniformData};
use crate::error::{CompositorError, Result};
use crate::pass::{Pass, PassId, remove_input, upsert_input};

impl<G: GlContext> Compositor<G> {
    /// Writes a uniform of the pass's program.
    ///
    /// Accepts any value convertible to [`UniformData`]: scalars, tuples, and
    /// fixed arrays of 1-4 `f32`/`i32`/`u32` components. A name the linker
    /// optimized away is tolerated silently, matching how drivers report it.
    pub fn set_uniform<V: Into<UniformData>>(
        &mut self,
        id: PassId,
        name: &str,
        value: V,
    ) -> Result<()> {
        let result = self.try_set_uniform(id, name, value.into());
        self.finish(result)
    }

    fn try_set_uniform(&mut self, id: PassId, name: &str, value: UniformData) -> Result<()> {
        let pass = self.passes.get(&id).ok_or(CompositorError::PassNotFound)?;
        let program = pass
            .program
            .ok_or(CompositorError::PassProgramNotInitialized)?;
        let gl = &self.gl;

        let previous = gl.current_program();
        gl.use_program(Some(program));
        if let Some(location) = gl.uniform_location(program, name) {
            gl.set_uniform(&location, value);
        }
        gl.use_program(previous);
        Ok(())
    }

    /// Records `texture` as the pass input sampled through uniform `name`.
    ///
    /// A new name appends to the input list; an existing name is overwritten
    /// in place, keeping its texture unit. The sampler unit indices of all
    /// inputs are (re)written to the program if one is loaded.
    pub fn set_input_texture(&mut self, id: PassId, name: &str, texture: G::Texture) -> Result<()> {
        let result = self.try_set_input_texture(id, name, texture);
        self.finish(result)
    }

    fn try_set_input_texture(&mut self, id: PassId, name: &str, texture: G::Texture) -> Result<()> {
        let Self { gl, passes, .. } = &mut *self;
        let pass = passes.get_mut(&id).ok_or(CompositorError::PassNotFound)?;

        upsert_input(&mut pass.inputs, name, texture);
        rebind_input_units(gl, pass);
        trace!("{id}: input '{name}' set ({} total)", pass.inputs.len());
        Ok(())
    }

    /// Removes the input named `name`, shifting later inputs one texture unit
    /// down and re-writing every remaining sampler index.
    pub fn remove_input_texture(&mut self, id: PassId, name: &str) -> Result<()> {
        let result = self.try_remove_input_texture(id, name);
        self.finish(result)
    }

    fn try_remove_input_texture(&mut self, id: PassId, name: &str) -> Result<()> {
        let Self { gl, passes, .. } = &mut *self;
        let pass = passes.get_mut(&id).ok_or(CompositorError::PassNotFound)?;

        if !remove_input(&mut pass.inputs, name) {
            return Err(CompositorError::TextureUniformNotFound);
        }
        rebind_input_units(gl, pass);
        trace!("{id}: input '{name}' removed ({} left)", pass.inputs.len());
        Ok(())
    }

    /// Attaches `texture` as the pass's output at color `channel`, replacing
    /// any previous attachment there, and rebuilds the draw-buffer list.
    ///
    /// # Panics
    /// When `channel` is not below [`MAX_OUTPUT_CHANNELS`]; channel indices
    /// are a caller contract, not runtime input.
    pub fn set_output_texture(&mut self, id: PassId, channel: u32, texture: G::Texture) -> Result<()> {
        assert!(
            channel < MAX_OUTPUT_CHANNELS,
            "output channel {channel} out of range"
        );
        let result = self.try_set_output_texture(id, channel, texture);
        self.finish(result)
    }

    fn try_set_output_texture(&mut self, id: PassId, channel: u32, texture: G::Texture) -> Result<()> {
        let Self { gl, passes, .. } = &mut *self;
        let pass = passes.get_mut(&id).ok_or(CompositorError::PassNotFound)?;

        attach_output(gl, pass, channel, Some(texture));
        pass.outputs.insert(channel, texture);
        pass.rebuild_draw_buffers();
        trace!("{id}: output channel {channel} set");
        Ok(())
    }

    /// Detaches the output at `channel` and rebuilds the draw-buffer list so
    /// the removed channel is no longer drawn to.
    pub fn remove_output_texture(&mut self, id: PassId, channel: u32) -> Result<()> {
        let result = self.try_remove_output_texture(id, channel);
        self.finish(result)
    }

    fn try_remove_output_texture(&mut self, id: PassId, channel: u32) -> Result<()> {
        let Self { gl, passes, .. } = &mut *self;
        let pass = passes.get_mut(&id).ok_or(CompositorError::PassNotFound)?;

        if pass.outputs.remove(&channel).is_none() {
            return Err(CompositorError::TextureOutputNotFound);
        }
        attach_output(gl, pass, channel, None);
        pass.rebuild_draw_buffers();
        trace!("{id}: output channel {channel} removed");
        Ok(())
    }
}

/// Writes each input's texture unit index (its position in the input list)
/// to the pass's sampler uniforms, under a program save/restore. A pass with
/// no program yet records the inputs only; the indices are written when a
/// shader is loaded.
pub(crate) fn rebind_input_units<G: GlContext>(gl: &G, pass: &Pass<G>) {
    let Some(program) = pass.program else {
        return;
    };

    let previous = gl.current_program();
    gl.use_program(Some(program));
    for (unit, (name, _)) in pass.inputs.iter().enumerate() {
        if let Some(location) = gl.uniform_location(program, name) {
            gl.set_uniform(&location, UniformData::I1(unit as i32));
        }
    }
    gl.use_program(previous);
}

/// Attaches or detaches a color attachment of the pass's render target,
/// preserving the caller's draw-framebuffer binding.
fn attach_output<G: GlContext>(
    gl: &G,
    pass: &Pass<G>,
    channel: u32,
    texture: Option<G::Texture>,
) {
    let previous = gl.draw_framebuffer_binding();
    gl.bind_draw_framebuffer(Some(pass.render_target));
    gl.framebuffer_color_texture(channel, texture);
    gl.bind_draw_framebuffer(previous);
}
