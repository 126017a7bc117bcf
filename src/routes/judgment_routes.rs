//! Judgment intake: `POST /judgment`.

use crate::error::GatewayError;
use crate::http_helpers::SessionId;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;

pub fn routes() -> Router<AppState> {
    Router::new().route("/judgment", post(judgment))
}

#[derive(Serialize)]
struct JudgmentResponse {
    status: String,
    message: String,
    #[serde(rename = "receivedJudgment")]
    received_judgment: bool,
}

/// Accepts user feedback on the last prediction for this session.
///
/// The payload must carry a boolean `isCorrect`; anything else is a 400
/// with nothing recorded. A judgment for a session with no live timer
/// (never predicted, or expired) is likewise rejected before any counter
/// moves.
async fn judgment(
    State(state): State<AppState>,
    session: SessionId,
    Json(body): Json<Value>,
) -> Result<Json<JudgmentResponse>, GatewayError> {
    let is_correct = body
        .get("isCorrect")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            GatewayError::MalformedInput(
                "Invalid judgment format. Expected a boolean value in the 'isCorrect' property."
                    .into(),
            )
        })?;

    state
        .telemetry
        .on_judgment_submitted(session.0.as_deref(), is_correct)?;

    Ok(Json(JudgmentResponse {
        status: "success".to_string(),
        message: "Judgment received".to_string(),
        received_judgment: is_correct,
    }))
}
