use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sheetsync_recon::ReconError;
use sheetsync_sheets::SheetsError;

/// Any failure of a pipeline run. Converted at the HTTP boundary into a
/// `500` with `{"status":"error","error": <message>}`; no partial
/// results ever accompany an error.
#[derive(Debug)]
pub enum ServiceError {
    Sheets(SheetsError),
    Recon(ReconError),
    /// Task plumbing failure (worker panicked or was cancelled).
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheets(e) => write!(f, "{e}"),
            Self::Recon(e) => write!(f, "{e}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<SheetsError> for ServiceError {
    fn from(e: SheetsError) -> Self {
        Self::Sheets(e)
    }
}

impl From<ReconError> for ServiceError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "pipeline run failed");
        let body = Json(serde_json::json!({
            "status": "error",
            "error": message,
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
