// src/repo/handlers.rs

use axum::{
    extract::{Extension, Query},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::graph::GraphService;
use super::models::*;
use super::services::RepoService;
use super::validators::RepoValidator;
use crate::common::{ApiError, AppState, Validator};

fn required_user_id(user_id: Option<String>) -> Result<String, ApiError> {
    user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId required".to_string()))
}

/// GET /api/repo?userId= - The candidate's full profile
pub async fn get_repo(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<RepoResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let user_id = required_user_id(query.user_id)?;

    let repo = RepoService::new(state.db).get_repo(&user_id).await?;

    debug!(
        user_id = %user_id,
        completeness = repo.stats.completeness,
        "Loaded repo"
    );

    Ok(Json(repo))
}

/// POST /api/repo/experiences - Add an experience
pub async fn add_experience(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<CreateExperience>,
) -> Result<Json<ExperienceResponse<CreatedExperience>>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = RepoValidator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let (Some(user_id), Some(company_name), Some(role_title)) = (
        request.user_id.as_deref(),
        request.company_name.as_deref(),
        request.role_title.as_deref(),
    ) else {
        return Err(ApiError::BadRequest(
            "userId, companyName, and roleTitle required".to_string(),
        ));
    };

    let experience = RepoService::new(state.db)
        .add_experience(user_id, company_name.trim(), role_title.trim(), &request)
        .await?;

    Ok(Json(ExperienceResponse {
        success: true,
        experience,
    }))
}

/// PUT /api/repo/experiences - Update an experience
pub async fn update_experience(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<UpdateExperience>,
) -> Result<Json<ExperienceResponse<ExperienceSummary>>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = RepoValidator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let (Some(user_id), Some(experience_id)) = (request.user_id.as_deref(), request.experience_id)
    else {
        return Err(ApiError::BadRequest(
            "userId and experienceId required".to_string(),
        ));
    };

    let experience = RepoService::new(state.db)
        .update_experience(user_id, experience_id, &request)
        .await?;

    Ok(Json(ExperienceResponse {
        success: true,
        experience,
    }))
}

/// DELETE /api/repo/experiences - Remove an experience
pub async fn remove_experience(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<DeleteExperience>,
) -> Result<Json<DeleteExperienceResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = RepoValidator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let (Some(user_id), Some(experience_id)) = (request.user_id.as_deref(), request.experience_id)
    else {
        return Err(ApiError::BadRequest(
            "userId and experienceId required".to_string(),
        ));
    };

    let removed = RepoService::new(state.db)
        .remove_experience(user_id, experience_id)
        .await?;

    Ok(Json(DeleteExperienceResponse {
        success: true,
        removed,
    }))
}

/// POST /api/onboarding-complete - Save what onboarding collected
pub async fn complete_onboarding(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = RepoValidator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let user_id = request.user_id.as_deref().unwrap_or_default();

    let saved = RepoService::new(state.db)
        .complete_onboarding(user_id, &request)
        .await
        .map_err(|e| match e {
            ApiError::DatabaseError(e) => ApiError::failed("Failed to complete onboarding", e),
            other => other,
        })?;

    Ok(Json(OnboardingResponse {
        success: true,
        saved,
        zep_synced: false,
    }))
}

/// GET /api/graph/user?userId=&source= - The candidate's knowledge graph
pub async fn user_graph(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<UserGraphResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let source = GraphSource::parse(query.source.as_deref());
    let user_id = required_user_id(query.user_id)?;

    if source == GraphSource::Zep {
        debug!(user_id = %user_id, "No external graph store; serving the local graph");
    }

    let graph = GraphService::new(state.db).user_graph(&user_id).await?;

    Ok(Json(graph))
}

/// POST /api/graph/user - Summarize the confirmed profile behind the graph
pub async fn sync_user_graph(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<SyncGraphRequest>,
) -> Result<Json<SyncGraphResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let user_id = required_user_id(request.user_id)?;

    let profile = GraphService::new(state.db)
        .profile_summary(&user_id)
        .await
        .map_err(|e| match e {
            ApiError::DatabaseError(e) => ApiError::failed("Failed to sync user profile", e),
            other => other,
        })?;

    info!(
        user_id = %user_id,
        skill_count = profile.skill_count,
        experience_count = profile.experience_count,
        external_sync_requested = request.sync_to_zep.unwrap_or(true),
        "User profile summarized for graph"
    );

    Ok(Json(SyncGraphResponse {
        success: true,
        zep_synced: false,
        profile,
    }))
}
