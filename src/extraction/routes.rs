// src/extraction/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the extraction router
pub fn extraction_routes() -> Router {
    Router::new()
        .route(
            "/api/extract",
            post(handlers::extract).get(handlers::list_pending),
        )
        .route("/api/extract/confirm", post(handlers::confirm_item))
}
