//! Application-wide error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use funding_core::FundingError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Funding(#[from] FundingError),

    #[error("Payment gateway refused: code {code}: {message}")]
    Gateway { code: i64, message: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Amount {amount} below the {min}-rial minimum")]
    BelowMinimum { amount: i64, min: i64 },
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Error body returned by every failing handler. `kind` is a stable,
/// machine-readable discriminator so clients can render a specific
/// message per failure kind.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl ServerError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::Migrate(_) | Self::Corrupt(_) => "storage",
            Self::Http(_) => "gateway_unreachable",
            Self::Json(_) => "bad_json",
            Self::Config(_) => "config",
            Self::Funding(FundingError::InvalidAmount(_)) => "invalid_amount",
            Self::Funding(FundingError::MessageTooLong { .. }) => "message_too_long",
            Self::Funding(FundingError::ItemAlreadyFulfilled) => "item_already_fulfilled",
            Self::Funding(FundingError::InvalidTarget) => "invalid_target",
            Self::Funding(FundingError::NegativeResult) => "negative_result",
            Self::Gateway { .. } => "gateway_refused",
            Self::NotFound(_) => "not_found",
            Self::BelowMinimum { .. } => "below_minimum",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Funding(FundingError::ItemAlreadyFulfilled) => StatusCode::CONFLICT,
            Self::Funding(FundingError::InvalidTarget) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Funding(_) | Self::Json(_) | Self::BelowMinimum { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Gateway { .. } | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Migrate(_) | Self::Config(_) | Self::Corrupt(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
