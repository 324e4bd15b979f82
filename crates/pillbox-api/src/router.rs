//! Axum router construction.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled so the
//! companion app can call the device from a browser context.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /update` -- reminder submission
/// - `GET /api/reminders` -- stored reminders
/// - `GET /api/status` -- device snapshot
/// - `GET /health` -- liveness probe
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/update", get(handlers::update))
        .route("/api/reminders", get(handlers::list_reminders))
        .route("/api/status", get(handlers::status))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
