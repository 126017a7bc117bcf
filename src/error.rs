//! Gateway error types and their HTTP mapping.
//!
//! Absent or expired session state is a client error, never a panic; the
//! telemetry stores treat absence as a normal value and the handlers map
//! it to a 400 here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A judgment arrived for a session with no live prediction timer
    /// (never started, or expired).
    #[error("no active prediction session; request a prediction first")]
    MissingSession,

    #[error("{0}")]
    MalformedInput(String),

    /// The remote model service could not be reached or answered non-2xx.
    #[error("model service failed")]
    UpstreamUnavailable(#[from] reqwest::Error),

    #[error("internal server error")]
    Internal(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::MissingSession | GatewayError::MalformedInput(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::UpstreamUnavailable(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
