//! Error types for pointer operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the snapshot pointer.
#[derive(Debug, Error)]
pub enum PointerError {
    /// No pointer has been written yet.
    #[error("pointer not found")]
    NotFound,

    /// The pointer file exists but does not decode.
    #[error("corrupt pointer file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Serialization failure while encoding the pointer.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding the pointer was poisoned by a panicking writer.
    #[error("pointer lock poisoned")]
    LockPoisoned,

    /// I/O error during file-based pointer operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for pointer operations.
pub type Result<T> = std::result::Result<T, PointerError>;
