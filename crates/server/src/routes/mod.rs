//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health              - Liveness check
//! GET   /health/ready        - Readiness check (store reachable)
//!
//! # Address
//! POST  /address             - Create an address
//! GET   /address/{id}        - View an address
//! PATCH /address/{id}        - Update an address
//! ```

pub mod address;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(address::create))
        .route("/{id}", get(address::view).patch(address::update))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/address", address_routes())
}
