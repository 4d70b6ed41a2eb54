// src/jobs/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::{
    deserialize_string_list, serialize_int_bool, serialize_json_array, serialize_json_value,
};

// ============================================================================
// Job Models
// ============================================================================

/// Full `jobs` row; array columns hold JSON text
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct Job {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub company_name: String,
    pub company_domain: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub workplace_type: Option<String>,
    pub employment_type: Option<String>,
    pub compensation: Option<String>,
    pub posted_date: Option<String>,
    pub updated_date: Option<String>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_interim: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_fractional: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_remote: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_active: Option<i64>,
    pub classification_confidence: Option<f64>,
    #[serde(serialize_with = "serialize_json_array")]
    pub skills_required: Option<String>,
    pub seniority_level: Option<String>,
    pub role_category: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub description_snippet: Option<String>,
    pub full_description: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub requirements: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub responsibilities: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub benefits: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub qualifications: Option<String>,
    pub about_company: Option<String>,
    pub about_team: Option<String>,
    pub hours_per_week: Option<String>,
    pub url: String,
    pub external_id: String,
}

/// Listing projection used by the board, featured jobs and company pages
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct JobSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub company_name: String,
    pub company_domain: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_remote: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_fractional: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_interim: Option<i64>,
    pub workplace_type: Option<String>,
    pub compensation: Option<String>,
    pub role_category: Option<String>,
    pub seniority_level: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub skills_required: Option<String>,
    pub posted_date: Option<String>,
    pub description_snippet: Option<String>,
}

/// Compact card returned by `POST /api/jobs-by-slug`
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct JobCard {
    pub slug: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_remote: Option<i64>,
    pub compensation: Option<String>,
}

/// Query parameters of `GET /api/jobs`
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub title: Option<String>,
    pub location: Option<String>,
    pub is_fractional: Option<bool>,
    pub is_interim: Option<bool>,
    pub seniority: Option<String>,
    /// Comma-separated; a job matches when it lists any of them
    pub skills: Option<String>,
    pub remote: Option<bool>,
    pub role_category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

#[derive(Serialize, Debug)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
    pub pagination: Pagination,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total: i64,
    pub london_jobs: i64,
    pub remote_jobs: i64,
    pub avg_day_rate: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct JobsBySlugRequest {
    #[serde(default)]
    pub slugs: Option<serde_json::Value>,
}

// ============================================================================
// Company page
// ============================================================================

/// Row of `company_brands`
#[derive(FromRow, Serialize, Debug, Clone)]
pub struct CompanyBrand {
    pub domain: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    #[serde(serialize_with = "serialize_json_value")]
    pub colors: Option<String>,
    pub founded: Option<String>,
    pub employees: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub industries: Option<String>,
    pub slogan: Option<String>,
    #[serde(serialize_with = "serialize_json_value")]
    pub socials: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompanyJobStats {
    pub total_jobs: usize,
    pub role_categories: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct CompanyJobsResponse {
    pub name: String,
    pub domain: String,
    pub jobs: Vec<JobSummary>,
    pub stats: CompanyJobStats,
    pub brand: Option<CompanyBrand>,
}

// ============================================================================
// Admin requests
// ============================================================================

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct CreateJob {
    pub title: String,
    pub company_name: String,
    pub url: String,
    pub slug: Option<String>,
    pub external_id: Option<String>,
    pub company_domain: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub workplace_type: Option<String>,
    pub employment_type: Option<String>,
    pub compensation: Option<String>,
    pub posted_date: Option<String>,
    pub is_interim: Option<bool>,
    pub is_fractional: Option<bool>,
    pub is_remote: Option<bool>,
    pub is_active: Option<bool>,
    pub classification_confidence: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub skills_required: Option<Vec<String>>,
    pub seniority_level: Option<String>,
    pub role_category: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub description_snippet: Option<String>,
    pub full_description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub requirements: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub qualifications: Option<Vec<String>>,
    pub about_company: Option<String>,
    pub about_team: Option<String>,
    pub hours_per_week: Option<String>,
}

/// Partial update; absent fields keep their stored value, arrays are replaced wholesale
#[derive(Deserialize, Debug, Default, Clone)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub url: Option<String>,
    pub company_domain: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub workplace_type: Option<String>,
    pub employment_type: Option<String>,
    pub compensation: Option<String>,
    pub posted_date: Option<String>,
    pub is_interim: Option<bool>,
    pub is_fractional: Option<bool>,
    pub is_remote: Option<bool>,
    pub is_active: Option<bool>,
    pub classification_confidence: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub skills_required: Option<Vec<String>>,
    pub seniority_level: Option<String>,
    pub role_category: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub description_snippet: Option<String>,
    pub full_description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub requirements: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub qualifications: Option<Vec<String>>,
    pub about_company: Option<String>,
    pub about_team: Option<String>,
    pub hours_per_week: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
