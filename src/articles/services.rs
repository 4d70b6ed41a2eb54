// src/articles/services.rs

use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{error, info};

use super::classifier::ArticleClassifier;
use super::models::*;
use crate::common::ApiError;

pub const CLASSIFY_PAUSE: Duration = Duration::from_millis(200);

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

const SUMMARY_COLUMNS: &str = r#"
    id, slug, title, excerpt, category, hero_asset_url, hero_asset_alt,
    published_at, word_count, is_featured
"#;

pub struct ArticleService {
    db: SqlitePool,
    app: String,
}

impl ArticleService {
    /// Articles are scoped to one `app`
    pub fn new(db: SqlitePool, app: impl Into<String>) -> Self {
        Self {
            db,
            app: app.into(),
        }
    }

    /// Published articles for this app, newest first
    pub async fn list_published(&self, filter: &ArticleFilter) -> Result<Vec<ArticleSummary>, ApiError> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let mut query = format!(
            "SELECT {} FROM articles WHERE status = 'published' AND app = ?",
            SUMMARY_COLUMNS
        );
        let category = filter.category.as_deref().filter(|c| !c.trim().is_empty());
        if category.is_some() {
            query.push_str(" AND category = ?");
        }
        query.push_str(" ORDER BY published_at IS NULL, published_at DESC LIMIT ?");

        let mut q = sqlx::query_as::<_, ArticleSummary>(&query).bind(&self.app);
        if let Some(category) = category {
            q = q.bind(category);
        }

        let articles = q.bind(limit).fetch_all(&self.db).await?;

        Ok(articles)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Article, ApiError> {
        sqlx::query_as::<_, Article>(
            r#"
            SELECT id, slug, title, excerpt, content, category, meta_description,
                   hero_asset_url, hero_asset_alt, published_at, word_count, generation_metadata
            FROM articles
            WHERE slug = ? AND status = 'published' AND app = ?
            "#,
        )
        .bind(slug)
        .bind(&self.app)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))
    }

    /// Stores a category and the model's reasoning on one article
    pub async fn save_classification(
        &self,
        article_id: i64,
        classification: &ArticleClassification,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE articles
            SET category = ?,
                generation_metadata = json_set(
                    COALESCE(generation_metadata, '{}'),
                    '$.classification',
                    json_object('confidence', ?, 'reasoning', ?, 'classified_at', ?)
                ),
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(classification.category.as_str())
        .bind(classification.confidence)
        .bind(&classification.reasoning)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(article_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Classifies every published article that has no category yet
    ///
    /// A failed article is counted and skipped; `pause` spaces out gateway calls.
    pub async fn classify_uncategorized(
        &self,
        classifier: &dyn ArticleClassifier,
        pause: Duration,
    ) -> Result<ClassifyResponse, ApiError> {
        let articles = sqlx::query_as::<_, UncategorizedArticle>(
            r#"
            SELECT id, title, excerpt
            FROM articles
            WHERE category IS NULL AND status = 'published'
            ORDER BY published_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        info!(total = articles.len(), "Classifying uncategorized articles");

        let mut classified = 0;
        let mut errors = 0;

        for article in &articles {
            let outcome = match classifier
                .classify(&article.title, article.excerpt.as_deref().unwrap_or_default())
                .await
            {
                Ok(classification) => {
                    match self.save_classification(article.id, &classification).await {
                        Ok(()) => Ok(classification),
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(ApiError::failed("Classification failed", e)),
            };

            match outcome {
                Ok(classification) => {
                    info!(
                        article_id = article.id,
                        category = %classification.category,
                        confidence = classification.confidence,
                        "Article classified"
                    );
                    classified += 1;
                    if !pause.is_zero() {
                        tokio::time::sleep(pause).await;
                    }
                }
                Err(e) => {
                    error!(article_id = article.id, error = %e, "Error classifying article");
                    errors += 1;
                }
            }
        }

        Ok(ClassifyResponse {
            classified,
            errors,
            total: articles.len(),
        })
    }
}
