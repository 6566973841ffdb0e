use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fl_ledger::LedgerError;
use fl_likes::LikeError;
use fl_payout::PayoutError;
use fl_pointer::PointerError;
use fl_store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The request itself is malformed. Reported before any I/O.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Like(#[from] LikeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pointer(#[from] PointerError),

    #[error("payout failed: {0}")]
    Payout(#[from] PayoutError),

    #[error("upload proxy error: {0}")]
    Upload(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Ledger(e) => ledger_status(e),
            Self::Like(LikeError::InvalidDelta) => StatusCode::BAD_REQUEST,
            Self::Like(LikeError::PostNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Like(LikeError::Ledger(e)) => ledger_status(e),
            Self::Store(e) => store_status(e),
            Self::Pointer(e) => pointer_status(e),
            Self::Payout(_) | Self::Upload(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn ledger_status(e: &LedgerError) -> StatusCode {
    match e {
        LedgerError::PostNotFound(_) | LedgerError::Empty => StatusCode::NOT_FOUND,
        LedgerError::DuplicateId(_) | LedgerError::CommitConflict { .. } => StatusCode::CONFLICT,
        LedgerError::Store(e) => store_status(e),
        LedgerError::Pointer(e) => pointer_status(e),
        LedgerError::CorruptSnapshot { .. }
        | LedgerError::IdChanged(_)
        | LedgerError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn pointer_status(e: &PointerError) -> StatusCode {
    match e {
        PointerError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: true,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_types::{Address, PostId};

    #[test]
    fn status_mapping() {
        let id = PostId::new("p1").unwrap();
        assert_eq!(ServerError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::from(LikeError::PostNotFound(id.clone())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(LikeError::InvalidDelta).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(LedgerError::CommitConflict { attempts: 3 }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServerError::from(LedgerError::CorruptSnapshot {
                address: Address::new("a").unwrap(),
                reason: "bad".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::from(LedgerError::Store(StoreError::Unavailable("down".into()))).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ServerError::from(PayoutError::Unavailable("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ServerError::from(LedgerError::Empty).status(), StatusCode::NOT_FOUND);
    }
}
