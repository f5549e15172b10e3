pub mod stats;
pub mod track;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// ─── Shared response envelope ────────────────────────────────────

/// Acknowledgement returned by the ingestion endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// The client sent something we could not read.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Store reset was requested but the server was started without `--allow-reset`.
    #[error("store reset is disabled")]
    ResetDisabled,
}

impl AppError {
    /// Message safe to show to callers.
    fn public_message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "invalid request body",
            Self::ResetDisabled => "reset is disabled",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log; callers only learn that it failed.
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ResetDisabled => StatusCode::FORBIDDEN,
        };
        tracing::warn!(status = status.as_u16(), error = %self, "request failed");

        let body = serde_json::json!({
            "success": false,
            "error":   self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}
