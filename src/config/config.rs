use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0, containing the predictor endpoint, session
/// store tuning, bind address and logging.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub bind_address: String,
    pub logging: LoggingConfig,
}

/// Endpoint of the remote sentiment model service. The service exposes
/// `POST /predict` and `GET /version` under this base URI.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct PredictorConfig {
    pub uri: String,
}

/// Tuning for the per-session telemetry stores. Both the prediction timer
/// store and the validation duration store use the same bounds.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SessionConfig {
    /// Seconds an entry stays live after its last write.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Maximum live entries per store; the oldest insertion is evicted
    /// when a new session would exceed this.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_ttl_seconds() -> u64 {
    1800
}

fn default_capacity() -> usize {
    20
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            ttl_seconds: default_ttl_seconds(),
            capacity: default_capacity(),
        }
    }
}

/// Load config from a YAML file named "config.yaml" in the current
/// directory, with `SENTIMENT_GATEWAY_*` environment overrides on top.
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed("SENTIMENT_GATEWAY_").split("__"));
    let config = match figment.extract::<Config>() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    match config {
        Config::ConfigV1(c) => c,
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
