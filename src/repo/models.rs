// src/repo/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::{serialize_int_bool, serialize_json_array};
use crate::extraction::models::PendingItem;

// ============================================================================
// Repo rows
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSkill {
    pub id: i64,
    pub user_id: String,
    pub skill_id: Option<i64>,
    pub skill_name_raw: Option<String>,
    pub proficiency_level: Option<String>,
    pub years_experience: Option<f64>,
    pub context: Option<String>,
    pub confidence: Option<f64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub confirmed: Option<i64>,
    pub confirmed_at: Option<String>,
    pub created_at: Option<String>,
    pub skill_name: Option<String>,
    pub skill_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserExperience {
    pub id: i64,
    pub user_id: String,
    pub employer_id: Option<i64>,
    pub company_name_raw: Option<String>,
    pub role_title: Option<String>,
    pub role_type: Option<String>,
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_current: Option<i64>,
    pub industry: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub achievements: Option<String>,
    pub team_size: Option<i64>,
    pub confidence: Option<f64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub confirmed: Option<i64>,
    pub confirmed_at: Option<String>,
    pub created_at: Option<String>,
    pub company_name: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserQualification {
    pub id: i64,
    pub user_id: String,
    pub qualification_type: String,
    pub name: String,
    pub institution: Option<String>,
    pub year_obtained: Option<i64>,
    pub confidence: Option<f64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub confirmed: Option<i64>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobPreferences {
    pub user_id: String,
    #[serde(serialize_with = "serialize_json_array")]
    pub role_types: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub preferred_locations: Option<String>,
    pub remote_preference: Option<String>,
    pub availability_days_per_week: Option<i64>,
    pub day_rate_min: Option<i64>,
    pub day_rate_max: Option<i64>,
    #[serde(serialize_with = "serialize_json_array")]
    pub industries_preferred: Option<String>,
    #[serde(serialize_with = "serialize_json_array")]
    pub company_stages: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
    pub total_skills: usize,
    pub confirmed_skills: usize,
    pub total_experiences: usize,
    pub pending_count: usize,
    pub completeness: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoResponse {
    pub skills: Vec<UserSkill>,
    pub experiences: Vec<UserExperience>,
    pub qualifications: Vec<UserQualification>,
    pub preferences: Option<JobPreferences>,
    pub pending_items: Vec<PendingItem>,
    pub stats: RepoStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

// ============================================================================
// Experiences
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateExperience {
    pub user_id: Option<String>,
    pub company_name: Option<String>,
    pub role_title: Option<String>,
    pub role_type: Option<String>,
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    pub is_current: Option<bool>,
    pub industry: Option<String>,
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExperience {
    pub user_id: Option<String>,
    pub experience_id: Option<i64>,
    pub company_name: Option<String>,
    pub role_title: Option<String>,
    pub role_type: Option<String>,
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    pub is_current: Option<bool>,
    pub industry: Option<String>,
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExperience {
    pub user_id: Option<String>,
    pub experience_id: Option<i64>,
}

/// Columns returned after an experience is written
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExperienceSummary {
    pub id: i64,
    pub role_title: Option<String>,
    pub company_name_raw: Option<String>,
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    #[serde(serialize_with = "serialize_int_bool")]
    pub is_current: Option<i64>,
    pub industry: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedExperience {
    #[serde(flatten)]
    pub experience: ExperienceSummary,
    pub company_name: String,
}

#[derive(Debug, Serialize)]
pub struct ExperienceResponse<T> {
    pub success: bool,
    pub experience: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovedExperience {
    pub id: i64,
    pub role_title: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteExperienceResponse {
    pub success: bool,
    pub removed: RemovedExperience,
}

// ============================================================================
// Onboarding
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<OnboardingExperience>,
    pub preferences: Option<OnboardingPreferences>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OnboardingExperience {
    pub company: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingPreferences {
    #[serde(default)]
    pub role_types: Vec<String>,
    pub day_rate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingSaved {
    pub skills: usize,
    pub experiences: usize,
    pub preferences: bool,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub success: bool,
    pub saved: OnboardingSaved,
    /// Always false: the graph is built locally from the saved rows
    #[serde(rename = "zepSynced")]
    pub zep_synced: bool,
}

// ============================================================================
// Knowledge graph
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQuery {
    pub user_id: Option<String>,
    pub source: Option<String>,
}

/// Where a graph read asks to be served from; only the local tables exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSource {
    Zep,
    Local,
    Auto,
}

impl GraphSource {
    /// Unknown or missing values read as `Auto`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("zep") => GraphSource::Zep,
            Some("local") => GraphSource::Local,
            _ => GraphSource::Auto,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncGraphRequest {
    pub user_id: Option<String>,
    pub sync_to_zep: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub skill_count: i64,
    pub experience_count: i64,
    pub has_preferences: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncGraphResponse {
    pub success: bool,
    pub zep_synced: bool,
    pub profile: ProfileSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    User,
    Skill,
    Company,
    Preference,
    Job,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub skill_count: usize,
    pub company_count: usize,
    pub preference_count: usize,
    pub matched_job_count: usize,
}

#[derive(Debug, Serialize)]
pub struct UserGraphResponse {
    pub graph: GraphData,
    pub source: &'static str,
    pub stats: GraphStats,
}
