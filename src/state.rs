//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! configuration, the model-service client, and the telemetry subsystem.

use crate::config::ConfigV1;
use crate::predictor::Predictor;
use crate::telemetry::Telemetry;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Client for the remote sentiment model service.
    pub predictor: Arc<dyn Predictor>,
    /// Session timers, validation durations and metrics.
    pub telemetry: Arc<Telemetry>,
}
