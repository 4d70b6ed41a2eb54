// src/jobs/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

/// Create the jobs router with all job-related routes
pub fn jobs_routes() -> Router {
    Router::new()
        // Public routes
        // NOTE: Specific routes must come BEFORE parameterized routes (:slug)
        .route("/api/jobs", get(handlers::list_jobs))
        .route("/api/jobs/featured", get(handlers::featured_jobs))
        .route("/api/jobs/stats", get(handlers::job_stats))
        .route("/api/jobs/:slug", get(handlers::get_job_by_slug))
        .route("/api/jobs-by-slug", post(handlers::jobs_by_slug))
        .route("/api/companies/:domain/jobs", get(handlers::company_jobs))
        // Admin job management routes
        .route("/api/admin/jobs", post(handlers::admin_create_job))
        .route(
            "/api/admin/jobs/:id",
            put(handlers::admin_update_job).delete(handlers::admin_delete_job),
        )
}
