use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use ledger_core::LedgerError;
use message_core::MessageError;
use voice_core::VoiceError;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Balance exhausted or jewel inactive: {0}")]
    ExhaustedOrInactive(String),

    #[error("Payment not confirmed: {0}")]
    PaymentNotConfirmed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable discriminator; clients branch on this, not
    /// on the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::ExhaustedOrInactive(_) => "exhausted_or_inactive",
            ApiError::PaymentNotConfirmed(_) => "payment_not_confirmed",
            ApiError::NotFound(_) => "not_found",
            ApiError::UpstreamUnavailable(_) => "upstream_unavailable",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::ExhaustedOrInactive(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::PaymentNotConfirmed(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::UpstreamUnavailable(msg) => tracing::error!("Upstream error: {msg}"),
            ApiError::Internal(msg) => tracing::error!("Internal error: {msg}"),
            _ => {}
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<MessageError> for ApiError {
    fn from(e: MessageError) -> Self {
        match e {
            MessageError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            MessageError::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(e: VoiceError) -> Self {
        match e {
            VoiceError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            VoiceError::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
            VoiceError::Storage(e) => ApiError::Internal(format!("storage failure: {e}")),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            LedgerError::ExhaustedOrInactive(msg) => ApiError::ExhaustedOrInactive(msg),
            LedgerError::NotFound(msg) => ApiError::NotFound(msg),
            LedgerError::PaymentNotConfirmed(msg) => ApiError::PaymentNotConfirmed(msg),
            LedgerError::InvalidSignature => {
                ApiError::InvalidInput("webhook signature verification failed".to_string())
            }
            LedgerError::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
        }
    }
}
