// src/articles/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::common::helpers::{serialize_int_bool, serialize_json_value};

/// Card shown on article listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArticleSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub hero_asset_url: Option<String>,
    pub hero_asset_alt: Option<String>,
    pub published_at: Option<String>,
    pub word_count: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_featured: Option<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub meta_description: Option<String>,
    pub hero_asset_url: Option<String>,
    pub hero_asset_alt: Option<String>,
    pub published_at: Option<String>,
    pub word_count: Option<i64>,
    #[serde(serialize_with = "serialize_json_value")]
    pub generation_metadata: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ArticleFilter {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleCategory {
    Finance,
    Marketing,
    Engineering,
    Operations,
    #[serde(rename = "HR")]
    Hr,
    Sales,
    General,
}

impl ArticleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleCategory::Finance => "Finance",
            ArticleCategory::Marketing => "Marketing",
            ArticleCategory::Engineering => "Engineering",
            ArticleCategory::Operations => "Operations",
            ArticleCategory::Hr => "HR",
            ArticleCategory::Sales => "Sales",
            ArticleCategory::General => "General",
        }
    }
}

impl fmt::Display for ArticleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model's verdict on one article
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleClassification {
    pub category: ArticleCategory,
    pub confidence: f64,
    pub reasoning: String,
}

/// Published article still waiting for a category
#[derive(Debug, Clone, FromRow)]
pub struct UncategorizedArticle {
    pub id: i64,
    pub title: String,
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifyResponse {
    pub classified: usize,
    pub errors: usize,
    pub total: usize,
}
