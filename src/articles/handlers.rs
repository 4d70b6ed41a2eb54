// src/articles/handlers.rs

use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::*;
use super::services::{ArticleService, CLASSIFY_PAUSE};
use crate::auth::AdminUser;
use crate::common::{safe_email_log, ApiError, AppState};

/// GET /api/articles - Published articles for this app
pub async fn list_articles(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let state = state_lock.read().await.clone();

    let articles = ArticleService::new(state.db, state.config.app_name)
        .list_published(&filter)
        .await?;

    Ok(Json(articles))
}

/// GET /api/articles/:slug - One published article
pub async fn get_article(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, ApiError> {
    let state = state_lock.read().await.clone();

    let article = ArticleService::new(state.db, state.config.app_name)
        .get_by_slug(&slug)
        .await?;

    Ok(Json(article))
}

/// POST /api/admin/articles/classify - Categorize every uncategorized article
pub async fn classify_articles(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if !state.gateway.is_configured() {
        return Err(ApiError::InternalServer(
            "PYDANTIC_AI_GATEWAY_API_KEY is required".to_string(),
        ));
    }

    let summary = ArticleService::new(state.db.clone(), state.config.app_name.clone())
        .classify_uncategorized(state.gateway.as_ref(), CLASSIFY_PAUSE)
        .await?;

    info!(
        admin_email = %safe_email_log(&admin.email),
        classified = summary.classified,
        errors = summary.errors,
        total = summary.total,
        "Article classification finished"
    );

    Ok(Json(summary))
}
