//! Index page.

use crate::state::AppState;
use axum::{extract::State, response::Html, routing::get, Router};
use tracing::warn;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// Renders the landing page with the gateway and model versions.
///
/// The model version comes from the model service's `/version` endpoint;
/// when that call fails the page still renders, showing "Unavailable".
async fn index(State(state): State<AppState>) -> Html<String> {
    let model_version = match state.predictor.model_version().await {
        Ok(version) => version,
        Err(e) => {
            warn!("Error fetching model version: {}", e);
            "Unavailable".to_string()
        }
    };

    Html(render_page(env!("CARGO_PKG_VERSION"), &model_version))
}

fn render_page(app_version: &str, model_version: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Sentiment Gateway</title>
</head>
<body>
  <h1>Sentiment Gateway</h1>
  <p>Submit a text to <code>POST /userInput</code> and judge the
     prediction via <code>POST /judgment</code>.</p>
  <footer>
    <small>gateway version {app_version} &middot; model version {model_version}</small>
  </footer>
</body>
</html>
"#
    )
}
