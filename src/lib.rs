//! Library exports for sentiment-gateway, shared between the binary and tests.

pub mod config;
pub mod error;
pub mod http_helpers;
pub mod predictor;
pub mod routes;
pub mod startup;
pub mod state;
pub mod telemetry;
pub mod utils;
