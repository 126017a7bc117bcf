//! Metrics exposition endpoint.

use crate::http_helpers::SessionId;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};

/// Creates the metrics route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Handler for the /metrics endpoint.
///
/// Returns all collected metrics in Prometheus text format. When the
/// caller has a session with a recorded validation duration, the snapshot
/// also carries that session's own last latency as a gauge.
async fn metrics_handler(State(state): State<AppState>, session: SessionId) -> impl IntoResponse {
    let metrics_text = state.telemetry.export(session.0.as_deref());

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics_text,
    )
}
