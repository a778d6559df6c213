//! Pipeline bookkeeping
//!
//! A pipeline is an ordered sequence of pass ids executed back-to-back as one
//! logical operation. The sequence may repeat and reorder passes freely; it is
//! validated against the live pass table both when it is stored and again on
//! every render, because passes can be mutated or deleted in between.

use std::collections::BTreeMap;
use std::fmt;

use crate::context::GlContext;
use crate::pass::{Pass, PassId};

/// Stable identifier of a pipeline, with the same allocation discipline as
/// [`PassId`]: monotonic per compositor instance, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PipelineId(pub(crate) u64);

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline#{}", self.0)
    }
}

/// An ordered sequence of passes.
#[derive(Default)]
pub(crate) struct Pipeline {
    pub(crate) sequence: Vec<PassId>,
}

/// Checks that every id in `sequence` resolves to an existing pass that is
/// initialized and has at least one output channel.
pub(crate) fn sequence_is_complete<G: GlContext>(
    sequence: &[PassId],
    passes: &BTreeMap<PassId, Pass<G>>,
) -> bool {
    sequence
        .iter()
        .all(|id| passes.get(id).is_some_and(Pass::renderable))
}
