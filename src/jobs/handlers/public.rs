// src/jobs/handlers/public.rs

use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::common::{ApiError, AppState};
use crate::jobs::models::*;
use crate::jobs::services::job_service::requested_slugs;
use crate::jobs::services::JobService;

/// GET /api/jobs - Filtered, paginated job board
pub async fn list_jobs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<JobListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let response = JobService::new(state.db).list_jobs(&filter).await?;

    Ok(Json(response))
}

/// GET /api/jobs/featured - Newest interim roles for the home page
pub async fn featured_jobs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<JobSummary>>, ApiError> {
    let state = state_lock.read().await.clone();

    let jobs = JobService::new(state.db).featured_jobs().await?;

    debug!(job_count = jobs.len(), "Loaded featured jobs");

    Ok(Json(jobs))
}

/// GET /api/jobs/stats - Headline numbers for the home page
pub async fn job_stats(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<JobStats>, ApiError> {
    let state = state_lock.read().await.clone();

    let stats = JobService::new(state.db).stats().await?;

    Ok(Json(stats))
}

/// GET /api/jobs/:slug - One active job
pub async fn get_job_by_slug(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(slug): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let state = state_lock.read().await.clone();

    let job = JobService::new(state.db).get_by_slug(&slug).await?;

    debug!(slug = %slug, job_title = %job.title, "Successfully loaded job details");

    Ok(Json(job))
}

/// POST /api/jobs-by-slug - Job cards for the voice UI
pub async fn jobs_by_slug(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<JobsBySlugRequest>,
) -> Result<Json<Vec<JobCard>>, ApiError> {
    let state = state_lock.read().await.clone();

    let slugs = requested_slugs(request.slugs.as_ref());
    if slugs.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let jobs = JobService::new(state.db)
        .jobs_by_slugs(&slugs)
        .await
        .map_err(|e| {
            warn!(error = %e, "jobs-by-slug lookup failed");
            e
        })?;

    Ok(Json(jobs))
}

/// GET /api/companies/:domain/jobs - Company page data
pub async fn company_jobs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(domain): Path<String>,
) -> Result<Json<CompanyJobsResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let response = JobService::new(state.db).company_jobs(&domain).await?;

    debug!(
        domain = %domain,
        job_count = response.jobs.len(),
        has_brand = response.brand.is_some(),
        "Loaded company page"
    );

    Ok(Json(response))
}
