use fl_ledger::LedgerError;
use fl_types::PostId;

/// Errors from like operations.
#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    /// A like must move the count by a non-zero amount.
    #[error("like delta must be non-zero")]
    InvalidDelta,

    #[error("post not found: {0}")]
    PostNotFound(PostId),

    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for LikeError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::PostNotFound(id) => Self::PostNotFound(id),
            other => Self::Ledger(other),
        }
    }
}
