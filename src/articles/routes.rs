// src/articles/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the articles router
pub fn articles_routes() -> Router {
    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:slug", get(handlers::get_article))
        .route(
            "/api/admin/articles/classify",
            post(handlers::classify_articles),
        )
}
