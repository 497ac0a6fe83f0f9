//! Turns ATM errors into the notices shown to the caller.
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::bank::{AmountRejection, AtmError, SessionId, TransactionError};

/// Where unauthenticated callers are sent.
pub const LOGIN_PATH: &str = "/";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Atm(#[from] AtmError),
    #[error("failed to export statement: {0}")]
    Export(#[from] csv::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Atm(err) => err.into_response(),
            ApiError::Export(err) => {
                tracing::error!(%err, "statement export failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "export_failed",
                    "The statement could not be generated.",
                )
            }
        }
    }
}

impl IntoResponse for AtmError {
    fn into_response(self) -> Response {
        match self {
            AtmError::AuthenticationFailed => json_error(
                StatusCode::UNAUTHORIZED,
                "authentication_failed",
                "Invalid PIN. Please try again.",
            ),
            AtmError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({
                    "error": "unauthorized",
                    "message": "Please log in to access the ATM.",
                    "login": LOGIN_PATH,
                })),
            )
                .into_response(),
            AtmError::Transaction(TransactionError::InvalidAmount(rejection)) => {
                let message = match rejection {
                    AmountRejection::NotANumber | AmountRejection::OutOfRange => {
                        "Invalid input. Please enter a number."
                    }
                    AmountRejection::NotPositive | AmountRejection::BelowPrecision => {
                        "Amount must be greater than zero."
                    }
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    axum::Json(json!({
                        "error": "invalid_amount",
                        "message": message,
                        "reason": rejection.to_string(),
                    })),
                )
                    .into_response()
            }
            AtmError::Transaction(TransactionError::InsufficientFunds { .. }) => json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_funds",
                "Insufficient funds.",
            ),
            AtmError::Unavailable => json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "The ATM is temporarily unavailable.",
            ),
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Reads the session id from an `Authorization: Bearer <id>` header.
pub fn bearer_session(headers: &HeaderMap) -> Option<SessionId> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?;
    SessionId::parse(token)
}

/// Like [`bearer_session`], but a missing or malformed token is `Unauthorized`.
pub fn require_session(headers: &HeaderMap) -> Result<SessionId, AtmError> {
    bearer_session(headers).ok_or(AtmError::Unauthorized)
}
