use fl_pointer::PointerError;
use fl_store::StoreError;
use fl_types::{Address, PostId};

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("snapshot {address} does not decode: {reason}")]
    CorruptSnapshot { address: Address, reason: String },

    #[error("post not found: {0}")]
    PostNotFound(PostId),

    #[error("post id already present in ledger: {0}")]
    DuplicateId(PostId),

    #[error("mutation of {0} changed the record id")]
    IdChanged(PostId),

    #[error("pointer kept moving; gave up after {attempts} attempts")]
    CommitConflict { attempts: u32 },

    #[error("no ledger snapshot has been committed yet")]
    Empty,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("pointer error: {0}")]
    Pointer(#[from] PointerError),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
