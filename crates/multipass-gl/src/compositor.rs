//! Pass/pipeline registries and the render executor
//!
//! [`Compositor`] owns the graphics context, the pass and pipeline tables,
//! and the shared full-screen geometry. It is single-threaded, synchronous,
//! and non-reentrant: every operation runs to completion on the thread that
//! owns the context, and render calls return once the draw has been issued
//! (GPU synchronization is the caller's concern).
//!
//! Validation runs before the state guard, so a failed render leaves the
//! ambient graphics state untouched.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, trace};

use crate::context::GlContext;
use crate::error::{CompositorError, Result};
use crate::pass::{Pass, PassId};
use crate::pipeline::{Pipeline, PipelineId, sequence_is_complete};
use crate::shader::SharedGeometry;
use crate::state::StateSnapshot;

/// Clear color applied to every pass's render target before its draw.
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// Multi-pass full-screen compositor over a [`GlContext`].
///
/// Passes and pipelines are stored in id-keyed tables; ids are allocated
/// monotonically and never reused within the lifetime of the instance. The
/// compositor exclusively owns the framebuffers and shader objects it
/// creates, and releases them on pass deletion and on drop. Input/output
/// texture handles are borrowed references: recorded and bound, never
/// created or deleted here.
pub struct Compositor<G: GlContext> {
    pub(crate) gl: G,
    pub(crate) shared: SharedGeometry<G>,
    pub(crate) passes: BTreeMap<PassId, Pass<G>>,
    pub(crate) pipelines: BTreeMap<PipelineId, Pipeline>,
    next_pass_id: u64,
    next_pipeline_id: u64,
    width: i32,
    height: i32,
    pub(crate) last_error: Option<CompositorError>,
}

impl<G: GlContext> Compositor<G> {
    /// Creates a compositor over a context-current `gl`, compiling the shared
    /// vertex stage and uploading the full-screen quad.
    ///
    /// The default resolution is 512x512; see [`set_resolution`](Self::set_resolution).
    pub fn new(gl: G) -> Self {
        let shared = SharedGeometry::new(&gl);
        Self {
            gl,
            shared,
            passes: BTreeMap::new(),
            pipelines: BTreeMap::new(),
            next_pass_id: 0,
            next_pipeline_id: 0,
            width: 512,
            height: 512,
            last_error: None,
        }
    }

    /// Borrow of the underlying graphics context.
    pub fn context(&self) -> &G {
        &self.gl
    }

    /// Sets the viewport dimensions used when rendering passes.
    pub fn set_resolution(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.last_error = None;
    }

    /// The configured render resolution `(width, height)`.
    pub fn resolution(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Returns and clears the error recorded by the most recent fallible
    /// operation. `None` means the most recent operation succeeded.
    pub fn take_last_error(&mut self) -> Option<CompositorError> {
        self.last_error.take()
    }

    /// Records the outcome of a fallible operation in the last-error slot:
    /// failures overwrite any unread value, successes clear it.
    pub(crate) fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        self.last_error = result.as_ref().err().cloned();
        result
    }

    // ------------------------------------------------------------------
    // Pass registry
    // ------------------------------------------------------------------

    /// Registers a new, empty, uninitialized pass and allocates its render
    /// target.
    pub fn create_pass(&mut self) -> PassId {
        let id = PassId(self.next_pass_id);
        self.next_pass_id += 1;

        let render_target = self.gl.create_framebuffer();
        self.passes.insert(id, Pass::new(render_target));
        self.last_error = None;

        debug!("created {id}");
        id
    }

    /// Deletes a pass, releasing its shader program, shader stage, and
    /// render target. Referencing the id afterwards yields
    /// [`CompositorError::PassNotFound`]; the id is never reallocated.
    pub fn delete_pass(&mut self, id: PassId) -> Result<()> {
        let result = self.try_delete_pass(id);
        self.finish(result)
    }

    fn try_delete_pass(&mut self, id: PassId) -> Result<()> {
        let Self {
            gl, shared, passes, ..
        } = &mut *self;
        let mut pass = passes.remove(&id).ok_or(CompositorError::PassNotFound)?;
        release_program(gl, shared.vertex_stage, &mut pass);
        gl.delete_framebuffer(pass.render_target);
        debug!("deleted {id}");
        Ok(())
    }

    /// True while `id` resolves to a live pass.
    pub fn contains_pass(&self, id: PassId) -> bool {
        self.passes.contains_key(&id)
    }

    /// Whether the pass has a successfully linked program. `None` for an
    /// unknown id. Introspection only; does not touch the error slot.
    pub fn pass_is_initialized(&self, id: PassId) -> Option<bool> {
        self.passes.get(&id).map(|pass| pass.initialized)
    }

    /// Compiles `source` as the pass's fragment stage, links it against the
    /// shared vertex stage, and re-establishes the `position` attribute
    /// binding. On success the previous stage/program are released and the
    /// pass becomes initialized; on failure the pass is left exactly as it
    /// was and no partially built object survives.
    pub fn load_shader_source(&mut self, id: PassId, source: &str) -> Result<()> {
        let result = self.try_load_shader_source(id, source);
        self.finish(result)
    }

    fn try_load_shader_source(&mut self, id: PassId, source: &str) -> Result<()> {
        let Self {
            gl, shared, passes, ..
        } = &mut *self;
        let pass = passes.get_mut(&id).ok_or(CompositorError::PassNotFound)?;

        let (stage, program) = shared.build_program(gl, source)?;
        shared.bind_position_attribute(gl, program);

        release_program(gl, shared.vertex_stage, pass);
        pass.shader_stage = Some(stage);
        pass.program = Some(program);
        pass.initialized = true;

        // Inputs recorded before the first shader load get their sampler
        // indices written now.
        crate::uniforms::rebind_input_units(gl, pass);

        debug!("loaded shader into {id}");
        Ok(())
    }

    /// Reads a fragment shader from `path` and loads it as
    /// [`load_shader_source`](Self::load_shader_source). An unreadable file
    /// reports [`CompositorError::ShaderFileNotFound`].
    pub fn load_shader_file(&mut self, id: PassId, path: impl AsRef<Path>) -> Result<()> {
        let result = self.try_load_shader_file(id, path.as_ref());
        self.finish(result)
    }

    fn try_load_shader_file(&mut self, id: PassId, path: &Path) -> Result<()> {
        if !self.passes.contains_key(&id) {
            return Err(CompositorError::PassNotFound);
        }
        let source =
            std::fs::read_to_string(path).map_err(|_| CompositorError::ShaderFileNotFound)?;
        self.try_load_shader_source(id, &source)
    }

    // ------------------------------------------------------------------
    // Pipeline registry
    // ------------------------------------------------------------------

    /// Registers a new pipeline with an empty sequence.
    pub fn create_pipeline(&mut self) -> PipelineId {
        let id = PipelineId(self.next_pipeline_id);
        self.next_pipeline_id += 1;

        self.pipelines.insert(id, Pipeline::default());
        self.last_error = None;

        debug!("created {id}");
        id
    }

    /// Deletes a pipeline, dropping its sequence. The referenced passes are
    /// untouched.
    pub fn delete_pipeline(&mut self, id: PipelineId) -> Result<()> {
        let result = self
            .pipelines
            .remove(&id)
            .map(|_| debug!("deleted {id}"))
            .ok_or(CompositorError::PipelineNotFound);
        self.finish(result)
    }

    /// Replaces the pipeline's sequence after validating every member
    /// against the current pass table. On failure the stored sequence is
    /// left unchanged (no partial update).
    pub fn set_sequence(&mut self, id: PipelineId, passes: &[PassId]) -> Result<()> {
        let result = self.try_set_sequence(id, passes);
        self.finish(result)
    }

    fn try_set_sequence(&mut self, id: PipelineId, passes: &[PassId]) -> Result<()> {
        if !self.pipelines.contains_key(&id) {
            return Err(CompositorError::PipelineNotFound);
        }
        if !sequence_is_complete(passes, &self.passes) {
            return Err(CompositorError::PipelineNotComplete);
        }
        if let Some(pipeline) = self.pipelines.get_mut(&id) {
            pipeline.sequence = passes.to_vec();
        }
        Ok(())
    }

    /// The pipeline's currently stored sequence, or
    /// [`CompositorError::PipelineNotFound`] for an unknown id.
    pub fn sequence(&mut self, id: PipelineId) -> Result<Vec<PassId>> {
        let result = self
            .pipelines
            .get(&id)
            .map(|pipeline| pipeline.sequence.clone())
            .ok_or(CompositorError::PipelineNotFound);
        self.finish(result)
    }

    // ------------------------------------------------------------------
    // Render executor
    // ------------------------------------------------------------------

    /// Renders a single pass into its attached output textures, bracketed by
    /// one ambient-state capture/restore pair.
    ///
    /// Fails — without touching ambient state — when the pass is unknown,
    /// has no linked program, or has no outputs.
    pub fn render_pass(&mut self, id: PassId) -> Result<()> {
        let result = self.try_render_pass(id);
        self.finish(result)
    }

    fn try_render_pass(&self, id: PassId) -> Result<()> {
        let pass = self.passes.get(&id).ok_or(CompositorError::PassNotFound)?;
        if !pass.initialized {
            return Err(CompositorError::PassProgramNotInitialized);
        }
        if pass.outputs.is_empty() {
            return Err(CompositorError::PassOutputNotFound);
        }

        let snapshot = StateSnapshot::capture(&self.gl);
        self.execute_pass(id, pass);
        snapshot.restore(&self.gl);
        Ok(())
    }

    /// Renders every pass of the pipeline in sequence order, inside a single
    /// state-guard bracket. The sequence is re-validated first, because the
    /// referenced passes may have been mutated or deleted since it was set.
    pub fn render_pipeline(&mut self, id: PipelineId) -> Result<()> {
        let result = self.try_render_pipeline(id);
        self.finish(result)
    }

    fn try_render_pipeline(&self, id: PipelineId) -> Result<()> {
        let pipeline = self
            .pipelines
            .get(&id)
            .ok_or(CompositorError::PipelineNotFound)?;
        if !sequence_is_complete(&pipeline.sequence, &self.passes) {
            return Err(CompositorError::PipelineNotComplete);
        }

        let snapshot = StateSnapshot::capture(&self.gl);
        for pass_id in &pipeline.sequence {
            if let Some(pass) = self.passes.get(pass_id) {
                self.execute_pass(*pass_id, pass);
            }
        }
        snapshot.restore(&self.gl);
        Ok(())
    }

    /// The fixed per-pass render sequence: bind the render target, bind each
    /// input to its sequential texture unit, select the draw buffers, set
    /// viewport and clear color, activate the program and quad geometry,
    /// clear, disable depth writes, draw the quad.
    fn execute_pass(&self, id: PassId, pass: &Pass<G>) {
        trace!(
            "rendering {id}: {} input(s), {} output channel(s)",
            pass.inputs.len(),
            pass.outputs.len()
        );
        let gl = &self.gl;

        gl.bind_draw_framebuffer(Some(pass.render_target));

        for (unit, (_, texture)) in pass.inputs.iter().enumerate() {
            gl.set_active_texture_unit(unit as u32);
            gl.bind_texture_2d(Some(*texture));
        }

        gl.draw_buffers(&pass.draw_buffers);
        gl.set_viewport(0, 0, self.width, self.height);
        gl.set_clear_color(CLEAR_COLOR);
        gl.use_program(pass.program);
        gl.bind_vertex_array(Some(self.shared.vertex_array));
        gl.bind_array_buffer(Some(self.shared.vertex_buffer));
        gl.clear_color_buffer();
        gl.set_depth_write(false);
        gl.draw_triangle_strip(0, 4);
    }
}

impl<G: GlContext> Drop for Compositor<G> {
    /// Releases everything the compositor owns: each remaining pass's
    /// program, stage, and render target, then the shared vertex stage and
    /// quad geometry.
    fn drop(&mut self) {
        let Self {
            gl, shared, passes, ..
        } = &mut *self;
        for pass in passes.values_mut() {
            release_program(gl, shared.vertex_stage, pass);
            gl.delete_framebuffer(pass.render_target);
        }
        passes.clear();
        shared.release(gl);
    }
}

/// Detaches and deletes the pass's current program and fragment stage, if
/// any. Used when replacing a shader, deleting a pass, and on drop.
fn release_program<G: GlContext>(gl: &G, vertex_stage: G::Shader, pass: &mut Pass<G>) {
    if let Some(program) = pass.program.take() {
        gl.detach_shader(program, vertex_stage);
        if let Some(stage) = pass.shader_stage {
            gl.detach_shader(program, stage);
        }
        gl.delete_program(program);
    }
    if let Some(stage) = pass.shader_stage.take() {
        gl.delete_shader(stage);
    }
}
