//! HTTP API Layer
//!
//! The Request Dispatcher: a thin Axum surface over the record gateway. It
//! parses the domain tag out of the path, calls the gateway's `get`/`set`
//! operations, and serializes results as JSON. All record semantics live in
//! the gateway; the routes are domain-parameterized, so a new record domain
//! needs no new route.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(gateway);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_records::RecordGateway;

use crate::handlers::{health, records};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<RecordGateway>,
}

/// Creates the main API router
///
/// # Routes
///
/// - `GET  /health`, `GET /health/ready` - probes
/// - `GET  /api/:domain/:id` - current record state
/// - `GET  /api/:domain/:id/history` - full commitment history
/// - `POST /api/:domain` - append a record entry
pub fn create_router(gateway: Arc<RecordGateway>) -> Router {
    let state = AppState { gateway };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let record_routes = Router::new()
        .route("/:domain", post(records::set_record))
        .route("/:domain/:id", get(records::get_current))
        .route("/:domain/:id/history", get(records::get_history))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api", record_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
