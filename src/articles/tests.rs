//! Tests for articles module

#[cfg(test)]
mod tests {
    use super::super::classifier::ArticleClassifier;
    use super::super::models::*;
    use super::super::services::ArticleService;
    use crate::common::migrations::test_pool;
    use crate::common::ApiError;
    use crate::services::gateway::{parse_json_reply, GatewayError};
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::time::Duration;

    struct KeywordClassifier;

    #[async_trait]
    impl ArticleClassifier for KeywordClassifier {
        async fn classify(
            &self,
            title: &str,
            _excerpt: &str,
        ) -> Result<ArticleClassification, GatewayError> {
            if title.contains("Broken") {
                return Err(GatewayError::InvalidResponse("No content in response".to_string()));
            }
            let category = if title.contains("CFO") {
                ArticleCategory::Finance
            } else {
                ArticleCategory::General
            };
            Ok(ArticleClassification {
                category,
                confidence: 0.9,
                reasoning: "keyword match".to_string(),
            })
        }
    }

    async fn insert_article(
        db: &SqlitePool,
        slug: &str,
        title: &str,
        status: &str,
        app: &str,
        category: Option<&str>,
        published_at: &str,
    ) {
        sqlx::query(
            r#"
            INSERT INTO articles (slug, title, content, status, app, category, published_at)
            VALUES (?, ?, 'Body', ?, ?, ?, ?)
            "#,
        )
        .bind(slug)
        .bind(title)
        .bind(status)
        .bind(app)
        .bind(category)
        .bind(published_at)
        .execute(db)
        .await
        .unwrap();
    }

    async fn seeded() -> SqlitePool {
        let db = test_pool().await;
        insert_article(&db, "interim-cfo-guide", "Interim CFO guide", "published", "interim", None, "2025-01-10").await;
        insert_article(&db, "hiring-a-cmo", "Hiring a CMO", "published", "interim", Some("Marketing"), "2025-02-10").await;
        insert_article(&db, "broken-draft", "Broken draft", "draft", "interim", None, "2025-03-10").await;
        insert_article(&db, "other-app", "Fractional COO", "published", "fractional", None, "2025-04-10").await;
        insert_article(&db, "broken-feed", "Broken feed", "published", "interim", None, "2025-05-10").await;
        db
    }

    #[tokio::test]
    async fn test_list_published_scopes_to_app_and_category() {
        let service = ArticleService::new(seeded().await, "interim");

        let all = service.list_published(&ArticleFilter::default()).await.unwrap();
        let slugs: Vec<&str> = all.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["broken-feed", "hiring-a-cmo", "interim-cfo-guide"]);

        let marketing = service
            .list_published(&ArticleFilter {
                category: Some("Marketing".to_string()),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(marketing.len(), 1);
        assert_eq!(marketing[0].slug, "hiring-a-cmo");

        let one = service
            .list_published(&ArticleFilter {
                category: None,
                limit: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_slug_hides_drafts_and_other_apps() {
        let service = ArticleService::new(seeded().await, "interim");

        let article = service.get_by_slug("hiring-a-cmo").await.unwrap();
        assert_eq!(article.title, "Hiring a CMO");
        assert_eq!(article.content, "Body");

        for slug in ["broken-draft", "other-app", "missing"] {
            let result = service.get_by_slug(slug).await;
            assert!(matches!(result, Err(ApiError::NotFound(_))), "{} should be hidden", slug);
        }
    }

    #[tokio::test]
    async fn test_classify_uncategorized_counts_failures() {
        let db = seeded().await;
        let service = ArticleService::new(db.clone(), "interim");

        let summary = service
            .classify_uncategorized(&KeywordClassifier, Duration::ZERO)
            .await
            .unwrap();

        // Drafts are skipped; the other app's published article is included
        assert_eq!(
            summary,
            ClassifyResponse {
                classified: 2,
                errors: 1,
                total: 3,
            }
        );

        let cfo = service.get_by_slug("interim-cfo-guide").await.unwrap();
        assert_eq!(cfo.category.as_deref(), Some("Finance"));
        let metadata = serde_json::to_value(&cfo).unwrap()["generation_metadata"].clone();
        assert_eq!(metadata["classification"]["reasoning"], "keyword match");
        assert_eq!(metadata["classification"]["confidence"], 0.9);

        let coo: Option<String> =
            sqlx::query_scalar("SELECT category FROM articles WHERE slug = 'other-app'")
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(coo.as_deref(), Some("General"));

        let again = service
            .classify_uncategorized(&KeywordClassifier, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(again.total, 1);
        assert_eq!(again.errors, 1);
    }

    #[test]
    fn test_classification_reply_parsing() {
        let reply: ArticleClassification = parse_json_reply(
            r#"{"category": "HR", "confidence": 0.72, "reasoning": "About hiring culture"}"#,
        )
        .unwrap();
        assert_eq!(reply.category, ArticleCategory::Hr);
        assert_eq!(reply.category.to_string(), "HR");

        let unknown = parse_json_reply::<ArticleClassification>(
            r#"{"category": "Legal", "confidence": 0.5, "reasoning": "Contracts"}"#,
        );
        assert!(unknown.is_err());
    }
}
