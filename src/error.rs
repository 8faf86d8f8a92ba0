use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::fees::FeeBreakdown;
use crate::ledger::models::TransactionStatus;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Insufficient credits: required {required}, available {available}")]
    InsufficientCredits {
        available: u64,
        required: u64,
        fees: FeeBreakdown,
    },

    #[error("Settlement error: {0}")]
    Settlement(#[from] SettlementError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("Duplicate transaction id: {0}")]
    DuplicateTransaction(Uuid),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors from the on-chain settlement leg.
///
/// The split matters for compensation: `TransferFailed` means the transfer
/// definitely did not happen and the debit can be refunded. `OutcomeUnknown`
/// (timeout, lost confirmation) means the transfer may already be on-chain,
/// so the orchestrator must NOT auto-refund.
#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("settlement transfer failed: {0}")]
    TransferFailed(String),

    #[error("settlement outcome unknown, manual review required: {0}")]
    OutcomeUnknown(String),
}

/// Errors from the external cross-chain bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("bridge unavailable: {0}")]
    Unavailable(String),

    #[error("bridge rejected request: {0}")]
    Rejected(String),
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::InvalidAddress(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ADDRESS",
                format!("Invalid address: {}", msg),
                None,
            ),
            AppError::InsufficientCredits {
                available,
                required,
                ref fees,
            } => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_CREDITS",
                format!(
                    "Insufficient credits. Required: {} ({} + {} fees), Available: {}",
                    required, fees.credits_amount, fees.total_fees, available
                ),
                Some(serde_json::json!({
                    "available": available,
                    "required": required,
                    "fees": fees,
                })),
            ),
            AppError::Settlement(SettlementError::TransferFailed(msg)) => (
                StatusCode::BAD_GATEWAY,
                "SETTLEMENT_FAILED",
                format!("On-chain settlement failed: {}", msg),
                None,
            ),
            AppError::Settlement(SettlementError::OutcomeUnknown(msg)) => (
                StatusCode::BAD_GATEWAY,
                "SETTLEMENT_UNCONFIRMED",
                format!("On-chain settlement unconfirmed: {}", msg),
                None,
            ),
            AppError::Bridge(BridgeError::Unavailable(msg)) => (
                StatusCode::BAD_GATEWAY,
                "BRIDGE_UNAVAILABLE",
                format!("Bridge unavailable: {}", msg),
                None,
            ),
            AppError::Bridge(BridgeError::Rejected(msg)) => (
                StatusCode::BAD_GATEWAY,
                "BRIDGE_REJECTED",
                format!("Bridge rejected request: {}", msg),
                None,
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Not found: {}", what),
                None,
            ),
            AppError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
                "Unauthorized - admin only".to_string(),
                None,
            ),
            AppError::InvalidTransition { from, to } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INVALID_TRANSITION",
                format!("Invalid status transition: {:?} -> {:?}", from, to),
                None,
            ),
            AppError::DuplicateTransaction(id) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DUPLICATE_TRANSACTION",
                format!("Duplicate transaction id: {}", id),
                None,
            ),
            AppError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                format!("Configuration error: {}", msg),
                None,
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(format!("Error converting: {:?}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Bridge(BridgeError::Unavailable(format!(
            "HTTP request error: {:?}",
            error
        )))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
