//! Error types for container decoding

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a tensor container.
///
/// Every variant is fatal for the file being loaded. Per-tensor comparison
/// differences are never errors; they end up in a [`crate::ComparisonResult`].
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Input path does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Header length is implausible or the header JSON is invalid
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A tensor's byte range runs past the end of the file
    #[error("truncated data for tensor '{name}': needs bytes up to {end}, file has {file_len}")]
    TruncatedData {
        /// Tensor name
        name: String,
        /// Absolute end offset required
        end: u64,
        /// Actual file length
        file_len: u64,
    },

    /// Byte span length disagrees with the declared shape and dtype
    #[error("shape mismatch for tensor '{name}': shape {shape:?} needs {expected} bytes, found {actual}")]
    ShapeMismatch {
        /// Tensor name
        name: String,
        /// Declared shape
        shape: Vec<usize>,
        /// Bytes implied by shape and dtype
        expected: u64,
        /// Bytes declared by data_offsets
        actual: u64,
    },

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias for container operations
pub type Result<T> = std::result::Result<T, ContainerError>;

impl ContainerError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedHeader(msg.into())
    }
}
