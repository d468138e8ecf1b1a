use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::error::{LedgerError, PeerError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Peer(#[from] PeerError),

    #[error("{0}")]
    BadRequest(String),

    #[error("mining worker failed: {0}")]
    Blocking(String),
}

impl From<BlockingError> for ApiError {
    fn from(err: BlockingError) -> Self {
        ApiError::Blocking(err.to_string())
    }
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Ledger(LedgerError::InvalidTransaction(_)) => "InvalidTransaction",
            ApiError::Ledger(LedgerError::ProofInvalid { .. }) => "ProofInvalid",
            ApiError::Ledger(LedgerError::ChainMismatch { .. }) => "ChainMismatch",
            ApiError::Ledger(LedgerError::CorruptChain { .. }) => "CorruptChain",
            ApiError::Ledger(LedgerError::NoPendingTransactions) => "NoPendingTransactions",
            ApiError::Peer(_) => "PeerError",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Blocking(_) => "InternalError",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::InvalidTransaction(_))
            | ApiError::Ledger(LedgerError::CorruptChain { .. })
            | ApiError::Ledger(LedgerError::NoPendingTransactions)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::ChainMismatch { .. }) => StatusCode::CONFLICT,
            ApiError::Ledger(LedgerError::ProofInvalid { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Peer(_) => StatusCode::BAD_GATEWAY,
            ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}
