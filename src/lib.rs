//! MapleStore Backend Library
//!
//! This library exports the core modules for the MapleStore backend server:
//! a storefront and admin REST API over PostgreSQL with JWT authentication.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod app_state;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use app_state::AppState;

/// Assemble the full API router. CORS is layered on by the caller so
/// tests can skip it.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(routes::auth_routes())
        .merge(routes::product_routes())
        .merge(routes::order_routes())
        .merge(routes::admin_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "MapleStore API Server"
}

async fn health_check() -> &'static str {
    "OK"
}
