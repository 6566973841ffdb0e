use fl_types::Address;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(Address),

    /// The backend could not be reached.
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    /// A read reached the backend but failed.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// A write reached the backend but failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The backend answered with something we cannot interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The backend is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Returns `true` when the error comes from an unreachable or misbehaving
    /// upstream rather than from a missing blob.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
