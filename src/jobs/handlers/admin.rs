// src/jobs/handlers/admin.rs

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::AdminUser;
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::jobs::models::*;
use crate::jobs::services::JobService;
use crate::jobs::validators::JobValidator;

/// POST /api/admin/jobs - Create a job listing
pub async fn admin_create_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
    Json(request): Json<CreateJob>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let state = state_lock.read().await.clone();

    let validator = JobValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            admin_email = %safe_email_log(&admin.email),
            errors = ?validation_result.errors,
            "Job creation validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let job = JobService::new(state.db).create_job(request).await?;

    info!(
        admin_email = %safe_email_log(&admin.email),
        job_id = %job.id,
        slug = %job.slug,
        "Admin created job"
    );

    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/admin/jobs/:id - Partially update a job listing
pub async fn admin_update_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJob>,
) -> Result<Json<Job>, ApiError> {
    let state = state_lock.read().await.clone();

    let validator = JobValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            job_id = %job_id,
            errors = ?validation_result.errors,
            "Job update validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let job = JobService::new(state.db).update_job(&job_id, request).await?;

    info!(
        admin_email = %safe_email_log(&admin.email),
        job_id = %job_id,
        "Admin updated job"
    );

    Ok(Json(job))
}

/// DELETE /api/admin/jobs/:id - Remove a job listing
pub async fn admin_delete_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
    Path(job_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    JobService::new(state.db).delete_job(&job_id).await?;

    info!(
        admin_email = %safe_email_log(&admin.email),
        job_id = %job_id,
        "Admin deleted job"
    );

    Ok(Json(MessageResponse {
        message: "Job deleted successfully".to_string(),
    }))
}
