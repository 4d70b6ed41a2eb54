// src/extraction/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::common::helpers::{
    deserialize_confidence, deserialize_lenient_f64, deserialize_lenient_i64,
    deserialize_lenient_items, deserialize_scalar_string, deserialize_string_list,
    serialize_json_value,
};

// ============================================================================
// Extracted facts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSkill {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub years_experience: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedCompany {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_year: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_current: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub achievements: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub team_size: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_validation: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedQualification {
    #[serde(rename = "type")]
    pub qualification_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPreference {
    #[serde(rename = "type")]
    pub preference_type: String,
    #[serde(deserialize_with = "deserialize_scalar_string")]
    pub value: String,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
}

/// Everything the model pulled out of one transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "deserialize_lenient_items")]
    pub skills: Vec<ExtractedSkill>,
    #[serde(default, deserialize_with = "deserialize_lenient_items")]
    pub companies: Vec<ExtractedCompany>,
    #[serde(default, deserialize_with = "deserialize_lenient_items")]
    pub qualifications: Vec<ExtractedQualification>,
    #[serde(default, deserialize_with = "deserialize_lenient_items")]
    pub preferences: Vec<ExtractedPreference>,
}

impl ExtractionResult {
    pub fn item_count(&self) -> usize {
        self.skills.len() + self.companies.len() + self.qualifications.len() + self.preferences.len()
    }
}

// ============================================================================
// Pending items
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Skill,
    Company,
    Qualification,
    Preference,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Skill => "skill",
            ItemType::Company => "company",
            ItemType::Qualification => "qualification",
            ItemType::Preference => "preference",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "skill" => Some(ItemType::Skill),
            "company" => Some(ItemType::Company),
            "qualification" => Some(ItemType::Qualification),
            "preference" => Some(ItemType::Preference),
            _ => None,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pending item was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmAction {
    Confirm,
    Reject,
    Edit,
}

impl ConfirmAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "confirm" => Some(ConfirmAction::Confirm),
            "reject" => Some(ConfirmAction::Reject),
            "edit" => Some(ConfirmAction::Edit),
            _ => None,
        }
    }

    /// Final `repo_pending_items.status` for this action
    pub fn status(&self) -> &'static str {
        match self {
            ConfirmAction::Confirm => "confirmed",
            ConfirmAction::Reject => "rejected",
            ConfirmAction::Edit => "edited",
        }
    }
}

/// Row of `repo_pending_items` as shown to the candidate
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PendingItem {
    pub id: i64,
    pub item_type: String,
    #[serde(serialize_with = "serialize_json_value")]
    pub extracted_data: Option<String>,
    pub confidence: Option<f64>,
    pub created_at: Option<String>,
}

// ============================================================================
// Requests and responses
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub transcript: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub incremental: bool,
    pub existing_data: Option<ExtractionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyQuestion {
    pub company_name: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    pub extraction: ExtractionResult,
    pub pending_count: usize,
    pub company_questions: Vec<CompanyQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending: Vec<PendingItem>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub item_id: Option<i64>,
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub edited_data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    pub action: ConfirmAction,
    pub item_type: String,
}
