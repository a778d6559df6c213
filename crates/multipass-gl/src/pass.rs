//! Pass bookkeeping
//!
//! A pass is the atomic unit of work: one shader program, an insertion-ordered
//! list of named input textures, and a channel-indexed map of output textures.
//! Input order determines the texture unit each input is bound to; output
//! channel order (ascending) determines the draw-buffer attachment list.

use std::collections::BTreeMap;
use std::fmt;

use crate::context::GlContext;

/// Stable identifier of a pass.
///
/// Allocated monotonically per compositor instance and never reused within
/// that instance's lifetime, including after the pass is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassId(pub(crate) u64);

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass#{}", self.0)
    }
}

/// One full-screen shader pass and the resources it owns.
///
/// The framebuffer, shader stage, and program handles are owned and released
/// by the compositor; input and output texture handles are borrowed from the
/// caller and never deleted.
pub(crate) struct Pass<G: GlContext> {
    /// Off-screen draw target, allocated at pass creation.
    pub(crate) render_target: G::Framebuffer,
    /// Fragment stage of the current program, if a shader has been loaded.
    pub(crate) shader_stage: Option<G::Shader>,
    /// Linked program, if a shader has been loaded.
    pub(crate) program: Option<G::Program>,
    /// True only after a successful compile and link.
    pub(crate) initialized: bool,
    /// `uniform name -> texture`, insertion-ordered. Position is the texture
    /// unit the input is bound to.
    pub(crate) inputs: Vec<(String, G::Texture)>,
    /// `channel -> texture`, iterated in ascending channel order.
    pub(crate) outputs: BTreeMap<u32, G::Texture>,
    /// Cached draw-buffer channel list, ascending. Rebuilt whenever
    /// `outputs` changes.
    pub(crate) draw_buffers: Vec<u32>,
}

impl<G: GlContext> Pass<G> {
    pub(crate) fn new(render_target: G::Framebuffer) -> Self {
        Self {
            render_target,
            shader_stage: None,
            program: None,
            initialized: false,
            inputs: Vec::new(),
            outputs: BTreeMap::new(),
            draw_buffers: Vec::new(),
        }
    }

    /// A pass can be rendered once it has a linked program and at least one
    /// output channel.
    pub(crate) fn renderable(&self) -> bool {
        self.initialized && !self.outputs.is_empty()
    }

    pub(crate) fn rebuild_draw_buffers(&mut self) {
        self.draw_buffers.clear();
        self.draw_buffers.extend(self.outputs.keys().copied());
    }
}

/// Inserts or overwrites an entry in an insertion-ordered association list.
///
/// Overwriting keeps the entry's original position, so texture unit indices
/// only shift when entries are added or removed.
pub(crate) fn upsert_input<T>(inputs: &mut Vec<(String, T)>, name: &str, value: T) {
    if let Some(slot) = inputs.iter_mut().find(|(key, _)| key == name) {
        slot.1 = value;
    } else {
        inputs.push((name.to_owned(), value));
    }
}

/// Removes an entry by name; returns false when the name is absent.
pub(crate) fn remove_input<T>(inputs: &mut Vec<(String, T)>, name: &str) -> bool {
    match inputs.iter().position(|(key, _)| key == name) {
        Some(index) => {
            inputs.remove(index);
            true
        }
        None => false,
    }
}
