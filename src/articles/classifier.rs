// src/articles/classifier.rs

use async_trait::async_trait;

use super::models::ArticleClassification;
use crate::services::gateway::GatewayError;
use crate::services::{GatewayClient, JsonPrompt};

const CLASSIFIER_PROMPT: &str = r#"You are an article classifier for an interim executive job board. Classify articles into exactly one category based on the C-suite role they relate to.

Categories:
- Finance: CFO, accounting, financial planning, fundraising, treasury
- Marketing: CMO, brand, demand generation, growth marketing, content
- Engineering: CTO, technology, software, infrastructure, architecture
- Operations: COO, processes, supply chain, logistics, business operations
- HR: CPO, CHRO, people operations, talent, hiring, culture
- Sales: CRO, revenue, business development, partnerships
- General: Broad interim executive topics not specific to one role

Respond with valid JSON only:
{"category": "Finance|Marketing|Engineering|Operations|HR|Sales|General", "confidence": 0.0-1.0, "reasoning": "brief explanation"}"#;

/// Assigns an article to one C-suite category
#[async_trait]
pub trait ArticleClassifier: Send + Sync {
    async fn classify(
        &self,
        title: &str,
        excerpt: &str,
    ) -> Result<ArticleClassification, GatewayError>;
}

#[async_trait]
impl ArticleClassifier for GatewayClient {
    async fn classify(
        &self,
        title: &str,
        excerpt: &str,
    ) -> Result<ArticleClassification, GatewayError> {
        let excerpt = if excerpt.trim().is_empty() {
            "No excerpt available"
        } else {
            excerpt
        };

        self.complete_json(JsonPrompt {
            system: CLASSIFIER_PROMPT,
            user: format!("Classify this article:\n\nTitle: {}\nExcerpt: {}", title, excerpt),
            temperature: 0.1,
            max_tokens: None,
        })
        .await
    }
}
