use fl_crypto::{HasherError, SignatureError};

/// Errors produced while building, signing, or submitting a payout.
#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    /// Payout configuration is unusable (bad secret, empty amount, ...).
    #[error("payout configuration error: {0}")]
    Configuration(String),

    /// The gateway does not know the requested account.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The gateway could not be reached.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),

    /// The gateway refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The gateway answered with something we cannot interpret.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),

    #[error("signing error: {0}")]
    Signing(#[from] SignatureError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<HasherError> for PayoutError {
    fn from(e: HasherError) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for payout operations.
pub type PayoutResult<T> = Result<T, PayoutError>;
