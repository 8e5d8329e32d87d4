//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Missing principal")]
    MissingPrincipal,

    #[error("Unknown principal: {0}")]
    UnknownPrincipal(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Withdrawal not found: {0}")]
    WithdrawalNotFound(String),

    #[error("Creator not found: {0}")]
    CreatorNotFound(String),

    #[error("Conflict: concurrent modification detected")]
    Conflict,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 402 Payment Required
            AppError::InsufficientFunds { requested, available } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_funds",
                Some(format!("requested {}, available {}", requested, available)),
            ),

            // 401 Unauthorized
            AppError::MissingPrincipal => {
                (StatusCode::UNAUTHORIZED, "missing_principal", None)
            }
            AppError::UnknownPrincipal(id) => {
                (StatusCode::UNAUTHORIZED, "unknown_principal", Some(id.clone()))
            }

            // 403 Forbidden
            AppError::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, "permission_denied", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::CampaignNotFound(id) => {
                (StatusCode::NOT_FOUND, "campaign_not_found", Some(id.clone()))
            }
            AppError::SubmissionNotFound(id) => {
                (StatusCode::NOT_FOUND, "submission_not_found", Some(id.clone()))
            }
            AppError::PaymentNotFound(id) => {
                (StatusCode::NOT_FOUND, "payment_not_found", Some(id.clone()))
            }
            AppError::WithdrawalNotFound(id) => {
                (StatusCode::NOT_FOUND, "withdrawal_not_found", Some(id.clone()))
            }
            AppError::CreatorNotFound(id) => {
                (StatusCode::NOT_FOUND, "creator_not_found", Some(id.clone()))
            }

            // 409 Conflict
            AppError::InvalidState(msg) => {
                (StatusCode::CONFLICT, "invalid_state", Some(msg.clone()))
            }
            AppError::Conflict => (StatusCode::CONFLICT, "conflict", None),

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => {
                if domain_err.is_client_error() {
                    (
                        StatusCode::BAD_REQUEST,
                        "validation_error",
                        Some(domain_err.to_string()),
                    )
                } else {
                    tracing::error!("Domain consistency error: {}", domain_err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    /// Whether the underlying database error is a serialization failure or
    /// deadlock, i.e. the request lost a concurrency race and may be retried
    /// a bounded number of times.
    pub fn is_concurrency_conflict(err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db_err) => matches!(
                db_err.code().as_deref(),
                Some("40001") | Some("40P01")
            ),
            _ => false,
        }
    }
}
