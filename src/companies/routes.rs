use super::handlers;
use axum::{routing::post, Router};

/// Creates the companies router
pub fn companies_routes() -> Router {
    Router::new().route("/api/company/validate", post(handlers::validate_company))
}
