//! Multi-pass full-screen compositing over OpenGL-style contexts
//!
//! This crate runs chains of full-screen fragment shader passes, each reading
//! textures through named sampler uniforms and writing one or more color
//! attachments of an off-screen render target. Passes are grouped into
//! pipelines and executed inside a state guard that leaves the host
//! application's graphics state exactly as it found it.
//!
//! All graphics access goes through the [`GlContext`] trait; enable the
//! `glow` feature for an implementation backed by a real OpenGL context.

mod compositor;
mod context;
mod error;
mod pass;
mod pipeline;
mod shader;
mod state;
mod uniforms;

#[cfg(feature = "glow")]
mod glow_backend;

pub use compositor::Compositor;
pub use context::{GlContext, MAX_OUTPUT_CHANNELS, MAX_TEXTURE_UNITS, ShaderStage, UniformData};
pub use error::{CompositorError, Result};
pub use pass::PassId;
pub use pipeline::PipelineId;
