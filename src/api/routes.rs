//! Route Definitions

use super::handlers::*;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))

        // Stateless verification
        .route("/api/verify", post(verify_handler))
        .route("/api/commitment", post(commitment_handler))

        // Shared console session
        .route("/api/session", get(session_handler))
        .route("/api/session/seeds", put(update_seeds_handler))
        .route("/api/session/rotate", post(rotate_seed_handler))
        .route("/api/session/run", post(run_handler))
        .route("/api/session/log", get(audit_log_handler))

        .with_state(state)
}
