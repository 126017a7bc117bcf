//! HTTP route definitions and handlers.
//!
//! This module organizes all HTTP endpoints into logical groups:
//! the index page, prediction forwarding, judgment intake, metrics
//! exposition, and health checks.

mod health_routes;
mod judgment_routes;
mod metrics_routes;
mod page_routes;
mod prediction_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// Combines all route modules into a single router and attaches
/// the application state for access in handlers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(page_routes::routes())
        .merge(prediction_routes::routes())
        .merge(judgment_routes::routes())
        .merge(metrics_routes::routes())
        .merge(health_routes::routes())
        .with_state(state)
}
