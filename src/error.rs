use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::gateway::GatewayError;

pub type AppResult<T> = Result<T, AppError>;

/// Request-level failures.
///
/// Bodies are plain text. Operation failures answer with a fixed message per
/// endpoint; the underlying gateway error is only logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("{message}: {source}")]
    Operation {
        message: &'static str,
        #[source]
        source: GatewayError,
    },
}

impl AppError {
    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound(message)
    }

    pub fn operation(message: &'static str, source: GatewayError) -> Self {
        Self::Operation { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Operation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::NotFound(message) => message,
            Self::Operation { message, .. } => message,
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(
            AppError::not_found("Contact could not be found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::operation("Failed to add contact", GatewayError::NotConnected).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn operation_error_keeps_source_in_display_only() {
        let err = AppError::operation(
            "Failed to add contact",
            GatewayError::validation("number", "12 is not a valid phone number!"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to add contact: number: 12 is not a valid phone number!"
        );
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
