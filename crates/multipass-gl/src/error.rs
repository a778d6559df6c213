//! Error taxonomy for compositor operations
//!
//! Every fallible operation returns [`CompositorError`] directly and also
//! records it in the compositor's last-error slot, so callers that poll the
//! slot and callers that match on results observe the same outcome.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, CompositorError>;

/// The failure modes of compositor operations.
///
/// All failures are local and recoverable: a caller may retry a shader load
/// with corrected source, or skip a pipeline that no longer validates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositorError {
    /// The referenced pass id is unknown or was deleted.
    #[error("pass not found")]
    PassNotFound,
    /// The referenced pipeline id is unknown or was deleted.
    #[error("pipeline not found")]
    PipelineNotFound,
    /// A pipeline sequence references a missing, uninitialized, or
    /// output-less pass.
    #[error("pipeline references a pass that is not renderable")]
    PipelineNotComplete,
    /// Render was attempted before a shader was successfully loaded.
    #[error("pass has no shader program loaded")]
    PassProgramNotInitialized,
    /// Render was attempted with no output textures attached.
    #[error("pass has no output textures attached")]
    PassOutputNotFound,
    /// The shader source file could not be read.
    #[error("shader source file not found")]
    ShaderFileNotFound,
    /// Fragment stage compilation failed; `log` carries the driver info log.
    #[error("fragment shader compilation failed: {log}")]
    ShaderCompileFail { log: String },
    /// Program linking failed; `log` carries the driver info log.
    #[error("shader program linking failed: {log}")]
    ShaderLinkingFail { log: String },
    /// The named input-texture uniform is not attached to the pass.
    #[error("input texture uniform not found")]
    TextureUniformNotFound,
    /// The output channel has no texture attached to the pass.
    #[error("output texture channel not found")]
    TextureOutputNotFound,
}
