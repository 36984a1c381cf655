//! Error taxonomy for layout and scene construction.
//!
//! Disposal of an already-released handle is deliberately absent here: the
//! scene backend reports it as a `false` return value and the lifecycle arena
//! counts it, but it never surfaces as an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A grid dimension, ring count or radius is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Merging or instancing a shape produced no result.
    #[error("Failed to build {0}: the scene returned no mesh")]
    BuildFailure(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
