//! Application startup and server initialization.
//!
//! This module handles the creation and configuration of the HTTP server,
//! including the model-service client, the telemetry subsystem, and route
//! setup.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::predictor::{HttpPredictor, Predictor};
use crate::routes;
use crate::state::AppState;
use crate::telemetry::Telemetry;

/// Initializes and runs the application server.
///
/// Builds the model-service client and the telemetry subsystem, binds to
/// the configured address and starts serving requests.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let predictor: Arc<dyn Predictor> = Arc::new(HttpPredictor::new(&config.predictor));
    let telemetry = Arc::new(Telemetry::new(&config.session));

    info!("Starting server on {}", config.bind_address);

    let state = AppState {
        config: config.clone(),
        predictor,
        telemetry,
    };

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
