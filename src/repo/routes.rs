// src/repo/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the repo router: profile, experiences, onboarding and graph
pub fn repo_routes() -> Router {
    Router::new()
        .route("/api/repo", get(handlers::get_repo))
        .route(
            "/api/repo/experiences",
            post(handlers::add_experience)
                .put(handlers::update_experience)
                .delete(handlers::remove_experience),
        )
        .route("/api/onboarding-complete", post(handlers::complete_onboarding))
        .route(
            "/api/graph/user",
            get(handlers::user_graph).post(handlers::sync_user_graph),
        )
}
