//! Prediction forwarding: `POST /userInput`.

use crate::error::GatewayError;
use crate::http_helpers::SessionId;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppState> {
    Router::new().route("/userInput", post(user_input))
}

#[derive(Deserialize)]
struct UserInputRequest {
    text: Option<String>,
}

#[derive(Serialize)]
struct UserInputResponse {
    label: String,
}

/// Forwards user text to the model service and returns the predicted
/// label.
///
/// Telemetry is recorded only after a completed round trip, so an
/// upstream failure surfaces as a 500 without skewing the request
/// counter. A caller with a session cookie also gets its validation
/// timer (re)started here.
async fn user_input(
    State(state): State<AppState>,
    session: SessionId,
    Json(body): Json<UserInputRequest>,
) -> Result<Json<UserInputResponse>, GatewayError> {
    let text = body
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GatewayError::MalformedInput("Missing 'text' in request body".into()))?;

    let prediction = state.predictor.predict(text).await?;

    state
        .telemetry
        .on_prediction_complete(session.0.as_deref(), prediction.latency.as_secs_f64());

    Ok(Json(UserInputResponse {
        label: prediction.label,
    }))
}
