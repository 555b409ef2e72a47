//! Route configuration.

use axum::{routing::get, Router};

use super::handlers::{dispatch_path, dispatch_root, health_check};
use super::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Action dispatch: /users/<action>[/<id>]
        .route("/users", get(dispatch_root).post(dispatch_root))
        .route("/users/", get(dispatch_root).post(dispatch_root))
        .route("/users/*path", get(dispatch_path).post(dispatch_path))
        .with_state(state)
}
