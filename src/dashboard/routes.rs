use super::handlers::*;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Build the dashboard router. Only GET routes exist.
pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/users", get(users_handler))
        .with_state(state)
}
