// src/extraction/handlers.rs

use axum::{
    extract::{Extension, Query},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::*;
use super::services::{extract_profile, ExtractionService};
use super::validators::ExtractionValidator;
use crate::common::{ApiError, AppState, Validator};

/// POST /api/extract - Extract profile facts from a transcript
pub async fn extract(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = ExtractionValidator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    info!(
        user_id = request.user_id.as_deref().unwrap_or("anonymous"),
        incremental = request.incremental,
        "Extracting profile from transcript"
    );

    let response = extract_profile(
        state.gateway.as_ref(),
        &state.company_validator(),
        &ExtractionService::new(state.db.clone()),
        request,
    )
    .await?;

    Ok(Json(response))
}

/// GET /api/extract?userId= - Items awaiting the candidate's confirmation
pub async fn list_pending(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<PendingResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let user_id = query
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId required".to_string()))?;

    let pending = ExtractionService::new(state.db).list_pending(&user_id).await?;

    Ok(Json(PendingResponse { pending }))
}

/// POST /api/extract/confirm - Confirm, edit or reject a pending item
pub async fn confirm_item(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = ExtractionValidator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let (Some(item_id), Some(user_id), Some(action)) = (
        request.item_id,
        request.user_id.as_deref(),
        request.action.as_deref().and_then(ConfirmAction::parse),
    ) else {
        return Err(ApiError::BadRequest(
            "itemId, userId, and action required".to_string(),
        ));
    };

    let response = ExtractionService::new(state.db)
        .resolve(item_id, user_id, action, request.edited_data)
        .await?;

    Ok(Json(response))
}
