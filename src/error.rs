use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Synthetic status for a transport-level timeout talking to the provider.
pub const TRANSPORT_TIMEOUT_STATUS: u16 = 504;
/// Synthetic status for any other transport-level failure (refused, DNS, TLS).
pub const TRANSPORT_FAILURE_STATUS: u16 = 502;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication with travel provider failed: {0}")]
    Authentication(String),

    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Maps a reqwest transport failure onto an upstream error with a synthetic status.
    pub fn transport(err: &reqwest::Error) -> Self {
        let status = if err.is_timeout() {
            TRANSPORT_TIMEOUT_STATUS
        } else {
            TRANSPORT_FAILURE_STATUS
        };
        AppError::upstream(status, err.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, payload) = match &self {
            AppError::Authentication(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Authentication with travel provider failed" }),
            ),
            AppError::Upstream { status, .. } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Travel provider request failed", "upstream_status": status }),
            ),
            AppError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
        };

        (status, Json(payload)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
