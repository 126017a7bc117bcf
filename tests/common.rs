use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use sentiment_gateway::config::{Config, ConfigV1};
use sentiment_gateway::predictor::{HttpPredictor, Predictor};
use sentiment_gateway::routes::create_router;
use sentiment_gateway::state::AppState;
use sentiment_gateway::telemetry::Telemetry;
use serde_json::Value;

/// Parses the standard test config, pointing the predictor at the given
/// (usually mockito) base URI.
pub fn load_test_config(predictor_uri: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:4200
predictor:
  uri: {predictor_uri}
session:
  ttl_seconds: 1800
  capacity: 20
logging:
  level: "debug"
  format: "json"
"#
    );

    let config: Config = Figment::new()
        .merge(Yaml::string(&yaml))
        .extract()
        .expect("Failed to parse test config YAML");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

pub fn build_app(config: ConfigV1) -> (Router, Arc<Telemetry>) {
    let config = Arc::new(config);
    let predictor: Arc<dyn Predictor> = Arc::new(HttpPredictor::new(&config.predictor));
    let telemetry = Arc::new(Telemetry::new(&config.session));

    let state = AppState {
        config: config.clone(),
        predictor,
        telemetry: telemetry.clone(),
    };

    (create_router(state), telemetry)
}

pub fn json_request(path: &str, session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("Content-Type", "application/json");
    if let Some(session_id) = session {
        builder = builder.header("Cookie", format!("session_id={}", session_id));
    }

    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get_request(path: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(session_id) = session {
        builder = builder.header("Cookie", format!("session_id={}", session_id));
    }

    builder.body(Body::empty()).expect("failed to build request")
}

pub async fn read_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body should be UTF-8")
}

/// Pulls a single sample value out of a Prometheus text snapshot.
pub fn metric_value(text: &str, line_prefix: &str) -> f64 {
    text.lines()
        .find(|l| l.starts_with(line_prefix) && !l.starts_with('#'))
        .and_then(|l| l.rsplit(' ').next())
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("metric line '{}' not found", line_prefix))
}
