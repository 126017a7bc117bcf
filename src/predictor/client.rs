use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::PredictorConfig;
use crate::error::GatewayError;

/// Outcome of one prediction round trip.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub label: String,
    /// Wall time of the full round trip to the model service.
    pub latency: Duration,
}

/// The external prediction collaborator. The gateway only needs two
/// operations from it: classify a text and report its model version.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, text: &str) -> Result<Prediction, GatewayError>;
    async fn model_version(&self) -> Result<String, GatewayError>;
}

/// Calls the model service over HTTP (`POST /predict`, `GET /version`).
pub struct HttpPredictor {
    base_uri: String,
    client: reqwest::Client,
}

impl HttpPredictor {
    pub fn new(config: &PredictorConfig) -> Self {
        HttpPredictor {
            base_uri: config.uri.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct PredictResponse {
    prediction: Option<i64>,
}

#[derive(Deserialize)]
struct VersionResponse {
    version: Option<String>,
}

#[async_trait]
impl Predictor for HttpPredictor {
    /// Forwards the text to the model service and maps its numeric
    /// prediction to a label: 1 is "Positive", anything else "Negative".
    async fn predict(&self, text: &str) -> Result<Prediction, GatewayError> {
        let url = format!("{}/predict", self.base_uri);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                warn!("Error communicating with model service: {}", e);
                GatewayError::UpstreamUnavailable(e)
            })?
            .error_for_status()?;

        let body: PredictResponse = response.json().await?;
        let latency = started.elapsed();

        let label = if body.prediction == Some(1) {
            "Positive"
        } else {
            "Negative"
        };
        debug!(label, latency_seconds = latency.as_secs_f64(), "prediction completed");

        Ok(Prediction {
            label: label.to_string(),
            latency,
        })
    }

    /// Fetches the model version; a well-formed response without a
    /// `version` field reads as "Unknown".
    async fn model_version(&self) -> Result<String, GatewayError> {
        let url = format!("{}/version", self.base_uri);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: VersionResponse = response.json().await?;
        Ok(body.version.unwrap_or_else(|| "Unknown".to_string()))
    }
}
