//! HTTP error response conversion
//!
//! `HttpToolsError` lets handlers return `Result<_, HttpToolsError>` and have
//! any `ToolsError` rendered as the standard error envelope
//! (`{"error": true, "message": ...}`) with the error's own status code.
//! The wrapper exists because `IntoResponse` and `ToolsError` are both
//! foreign to this crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use satchel_core::{ErrorMetadata, LogLevel, ToolsError};

use crate::json::{error_json, ErrorJsonOptions};

#[derive(Debug)]
pub struct HttpToolsError(pub ToolsError);

impl From<ToolsError> for HttpToolsError {
    fn from(err: ToolsError) -> Self {
        HttpToolsError(err)
    }
}

impl std::fmt::Display for HttpToolsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

fn log_error(error: &ToolsError) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code = error_code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code = error_code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code = error_code, "Request failed");
        }
    }
}

impl IntoResponse for HttpToolsError {
    fn into_response(self) -> Response {
        let error = &self.0;
        log_error(error);

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match error_json(&error.client_message(), &ErrorJsonOptions { status }) {
            Ok(response) => response,
            Err(_) => status.into_response(),
        }
    }
}
