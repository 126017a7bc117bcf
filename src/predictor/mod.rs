//! Outbound client for the remote sentiment model service.

mod client;

pub use client::{HttpPredictor, Prediction, Predictor};
