use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid media type: {0}")]
    InvalidMediaType(String),

    #[error("empty {0}")]
    Empty(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),
}
