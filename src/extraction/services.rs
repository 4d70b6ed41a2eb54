// src/extraction/services.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info, warn};

use super::extractor::ProfileExtractor;
use super::models::{
    CompanyQuestion, ConfirmAction, ConfirmResponse, ExtractRequest, ExtractResponse,
    ExtractedCompany, ExtractedPreference, ExtractedQualification, ExtractedSkill,
    ExtractionResult, ItemType, PendingItem,
};
use crate::common::helpers::to_json_array;
use crate::common::ApiError;
use crate::companies::normalize::loose_normalized_name;
use crate::companies::services::upsert_extracted_employer;
use crate::companies::CompanyValidator;

const DEFAULT_CONFIDENCE: f64 = 0.9;
const DEFAULT_SKILL_CATEGORY: &str = "other";

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static LEADING_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)").unwrap());

pub struct ExtractionService {
    db: SqlitePool,
}

impl ExtractionService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Stores every extracted item as a pending row; returns how many were saved
    ///
    /// A row that fails to insert is logged and skipped. With a session id the
    /// whole extraction is also appended to that session's history.
    pub async fn save_pending(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        result: &ExtractionResult,
    ) -> usize {
        let mut saved = 0;

        for (item_type, data, confidence) in pending_rows(result) {
            let inserted = sqlx::query(
                r#"
                INSERT INTO repo_pending_items (user_id, item_type, extracted_data, confidence, status)
                VALUES (?, ?, ?, ?, 'pending')
                "#,
            )
            .bind(user_id)
            .bind(item_type.as_str())
            .bind(data.to_string())
            .bind(confidence)
            .execute(&self.db)
            .await;

            match inserted {
                Ok(_) => saved += 1,
                Err(e) => error!(user_id = %user_id, item_type = %item_type, error = %e, "Error saving pending item"),
            }
        }

        if let Some(session_id) = session_id {
            if let Err(e) = self.append_to_session(user_id, session_id, result).await {
                error!(session_id = %session_id, error = %e, "Error updating extraction session");
            }
        }

        info!(user_id = %user_id, saved, "Saved pending extractions");
        saved
    }

    async fn append_to_session(
        &self,
        user_id: &str,
        session_id: &str,
        result: &ExtractionResult,
    ) -> Result<(), ApiError> {
        let payload = serde_json::to_string(result)
            .map_err(|e| ApiError::failed("Error encoding extraction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE extraction_sessions
            SET pending_extractions = json_insert(COALESCE(pending_extractions, '[]'), '$[#]', json(?))
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(payload)
        .bind(session_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            debug!(session_id = %session_id, "No extraction session to update");
        }

        Ok(())
    }

    /// Pending items for a user, most confident first
    pub async fn list_pending(&self, user_id: &str) -> Result<Vec<PendingItem>, ApiError> {
        let pending = sqlx::query_as::<_, PendingItem>(
            r#"
            SELECT id, item_type, extracted_data, confidence, created_at
            FROM repo_pending_items
            WHERE user_id = ? AND status = 'pending'
            ORDER BY confidence IS NOT NULL, confidence DESC, created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(pending)
    }

    /// Resolves one pending item, promoting it into the Repo unless rejected
    pub async fn resolve(
        &self,
        item_id: i64,
        user_id: &str,
        action: ConfirmAction,
        edited_data: Option<Value>,
    ) -> Result<ConfirmResponse, ApiError> {
        let mut tx = self.db.begin().await?;

        let (raw_type, stored_data): (String, String) = sqlx::query_as(
            r#"
            SELECT item_type, extracted_data
            FROM repo_pending_items
            WHERE id = ? AND user_id = ? AND status = 'pending'
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

        let item_type = ItemType::parse(&raw_type).ok_or_else(|| {
            ApiError::InternalServer(format!("Unknown pending item type: {}", raw_type))
        })?;

        match action {
            ConfirmAction::Reject => {
                sqlx::query(
                    "UPDATE repo_pending_items SET status = 'rejected', resolved_at = datetime('now') WHERE id = ?",
                )
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
            }
            ConfirmAction::Confirm | ConfirmAction::Edit => {
                let data = match edited_data.filter(|d| !d.is_null()) {
                    Some(edited) if action == ConfirmAction::Edit => edited,
                    _ => serde_json::from_str(&stored_data)
                        .map_err(|e| ApiError::failed("Stored extraction is not valid JSON", e))?,
                };

                promote(&mut *tx, user_id, item_type, &data).await?;

                sqlx::query(
                    r#"
                    UPDATE repo_pending_items
                    SET status = ?, resolved_at = datetime('now'), extracted_data = ?
                    WHERE id = ?
                    "#,
                )
                .bind(action.status())
                .bind(data.to_string())
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            item_id,
            user_id = %user_id,
            item_type = %item_type,
            status = action.status(),
            "Resolved pending item"
        );

        Ok(ConfirmResponse {
            success: true,
            action,
            item_type: item_type.as_str().to_string(),
        })
    }
}

/// Extracts, validates companies and (with a user) stores pending items
pub async fn extract_profile(
    extractor: &dyn ProfileExtractor,
    validator: &CompanyValidator,
    service: &ExtractionService,
    request: ExtractRequest,
) -> Result<ExtractResponse, ApiError> {
    let transcript = request.transcript.as_deref().unwrap_or_default();

    let extracted = match (request.incremental, request.existing_data.as_ref()) {
        (true, Some(existing)) => extractor.extract_incremental(transcript, existing).await,
        _ => extractor.extract(transcript).await,
    }
    .map_err(|e| ApiError::failed("Extraction failed", e))?;

    let (companies, company_questions) = enrich_companies(validator, extracted.companies).await;
    let extraction = ExtractionResult {
        companies,
        ..extracted
    };

    if let Some(user_id) = request.user_id.as_deref().filter(|u| !u.is_empty()) {
        service
            .save_pending(user_id, request.session_id.as_deref(), &extraction)
            .await;
    }

    Ok(ExtractResponse {
        success: true,
        pending_count: extraction.item_count(),
        extraction,
        company_questions,
    })
}

/// Flattens an extraction into `(type, data, confidence)` rows
pub fn pending_rows(result: &ExtractionResult) -> Vec<(ItemType, Value, f64)> {
    fn row<T: serde::Serialize>(item_type: ItemType, item: &T, confidence: f64) -> Option<(ItemType, Value, f64)> {
        match serde_json::to_value(item) {
            Ok(value) => Some((item_type, value, confidence)),
            Err(e) => {
                warn!(item_type = %item_type, error = %e, "Skipping unencodable extracted item");
                None
            }
        }
    }

    let skills = result.skills.iter().filter_map(|s| row(ItemType::Skill, s, s.confidence));
    let companies = result.companies.iter().filter_map(|c| row(ItemType::Company, c, c.confidence));
    let qualifications = result
        .qualifications
        .iter()
        .filter_map(|q| row(ItemType::Qualification, q, q.confidence));
    let preferences = result
        .preferences
        .iter()
        .filter_map(|p| row(ItemType::Preference, p, p.confidence));

    skills.chain(companies).chain(qualifications).chain(preferences).collect()
}

/// Runs each extracted company through the validation cascade
///
/// The cascade's normalized name replaces the extracted one, the higher of the
/// two confidences wins, and any follow-up question is collected.
pub async fn enrich_companies(
    validator: &CompanyValidator,
    companies: Vec<ExtractedCompany>,
) -> (Vec<ExtractedCompany>, Vec<CompanyQuestion>) {
    let mut enriched = Vec::with_capacity(companies.len());
    let mut questions = Vec::new();

    for company in companies {
        let validation = validator.validate(&company.name).await;

        if validation.needs_confirmation {
            if let Some(question) = validation.confirmation_question.clone() {
                questions.push(CompanyQuestion {
                    company_name: company.name.clone(),
                    question,
                    suggested_url: validation.suggested_url.clone(),
                });
            }
        }

        let normalized_name = validation
            .company
            .map(|c| c.normalized_name)
            .filter(|n| !n.is_empty())
            .or(company.normalized_name);

        enriched.push(ExtractedCompany {
            normalized_name,
            needs_validation: Some(validation.needs_confirmation),
            confidence: company.confidence.max(validation.confidence),
            ..company
        });
    }

    (enriched, questions)
}

fn decode<T: DeserializeOwned>(item_type: ItemType, data: &Value) -> Result<T, ApiError> {
    serde_json::from_value(data.clone())
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} data: {}", item_type, e)))
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

fn confidence_or_default(confidence: f64) -> f64 {
    if confidence > 0.0 {
        confidence
    } else {
        DEFAULT_CONFIDENCE
    }
}

/// Writes confirmed data into the Repo table for its item type
pub async fn promote(
    conn: &mut SqliteConnection,
    user_id: &str,
    item_type: ItemType,
    data: &Value,
) -> Result<(), ApiError> {
    match item_type {
        ItemType::Skill => {
            let skill: ExtractedSkill = decode(item_type, data)?;
            promote_skill(conn, user_id, &skill).await?;
        }
        ItemType::Company => {
            let company: ExtractedCompany = decode(item_type, data)?;
            promote_company(conn, user_id, &company).await?;
        }
        ItemType::Qualification => {
            let qualification: ExtractedQualification = decode(item_type, data)?;
            promote_qualification(conn, user_id, &qualification).await?;
        }
        ItemType::Preference => {
            let preference: ExtractedPreference = decode(item_type, data)?;
            promote_preference(conn, user_id, &preference).await?;
        }
    }

    Ok(())
}

pub async fn promote_skill(
    conn: &mut SqliteConnection,
    user_id: &str,
    skill: &ExtractedSkill,
) -> Result<i64, sqlx::Error> {
    let category = non_empty(skill.category.as_ref()).unwrap_or(DEFAULT_SKILL_CATEGORY);

    let skill_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO skills (name, category)
        VALUES (?, ?)
        ON CONFLICT (name) DO UPDATE SET category = COALESCE(skills.category, excluded.category)
        RETURNING id
        "#,
    )
    .bind(&skill.name)
    .bind(category)
    .fetch_one(&mut *conn)
    .await?;

    // Onboarding stores skills by raw name only; attach those before upserting
    sqlx::query(
        "UPDATE user_skills SET skill_id = ? WHERE user_id = ? AND skill_name_raw = ? AND skill_id IS NULL",
    )
    .bind(skill_id)
    .bind(user_id)
    .bind(&skill.name)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_skills (
            user_id, skill_id, skill_name_raw, proficiency_level,
            years_experience, context, confidence, confirmed, confirmed_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, 1, datetime('now'))
        ON CONFLICT (user_id, skill_id) DO UPDATE SET
            proficiency_level = COALESCE(excluded.proficiency_level, user_skills.proficiency_level),
            years_experience = COALESCE(excluded.years_experience, user_skills.years_experience),
            context = COALESCE(excluded.context, user_skills.context),
            confirmed = 1,
            confirmed_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(skill_id)
    .bind(&skill.name)
    .bind(non_empty(skill.proficiency.as_ref()))
    .bind(skill.years_experience)
    .bind(non_empty(skill.context.as_ref()))
    .bind(confidence_or_default(skill.confidence))
    .execute(&mut *conn)
    .await?;

    Ok(skill_id)
}

pub async fn promote_company(
    conn: &mut SqliteConnection,
    user_id: &str,
    company: &ExtractedCompany,
) -> Result<i64, sqlx::Error> {
    let normalized_name = non_empty(company.normalized_name.as_ref())
        .map(str::to_string)
        .unwrap_or_else(|| loose_normalized_name(&company.name));

    let employer_id = upsert_extracted_employer(conn, &company.name, &normalized_name).await?;

    sqlx::query(
        r#"
        INSERT INTO user_experiences (
            user_id, employer_id, company_name_raw, role_title, role_type,
            start_year, end_year, is_current, achievements, team_size,
            confidence, confirmed, confirmed_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, datetime('now'))
        "#,
    )
    .bind(user_id)
    .bind(employer_id)
    .bind(&company.name)
    .bind(non_empty(company.role.as_ref()))
    .bind(non_empty(company.role_type.as_ref()))
    .bind(company.start_year)
    .bind(company.end_year)
    .bind(company.is_current.unwrap_or(false))
    .bind(to_json_array(company.achievements.as_deref()))
    .bind(company.team_size)
    .bind(confidence_or_default(company.confidence))
    .execute(&mut *conn)
    .await?;

    Ok(employer_id)
}

pub async fn promote_qualification(
    conn: &mut SqliteConnection,
    user_id: &str,
    qualification: &ExtractedQualification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_qualifications (
            user_id, qualification_type, name, institution,
            year_obtained, confidence, confirmed
        )
        VALUES (?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(user_id)
    .bind(&qualification.qualification_type)
    .bind(&qualification.name)
    .bind(non_empty(qualification.institution.as_ref()))
    .bind(qualification.year)
    .bind(confidence_or_default(qualification.confidence))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Array column a list-valued preference type appends to
fn preference_list_column(preference_type: &str) -> Option<&'static str> {
    match preference_type {
        "role" => Some("role_types"),
        "location" => Some("preferred_locations"),
        "industry" => Some("industries_preferred"),
        "companyStage" => Some("company_stages"),
        _ => None,
    }
}

/// "3 days per week" → 3; zero and non-numeric values yield `None`
pub fn parse_availability_days(value: &str) -> Option<i64> {
    LEADING_INTEGER
        .captures(value)
        .and_then(|c| c[1].parse::<i64>().ok())
        .filter(|days| *days > 0)
}

/// "£1,000-1,500/day" → (1000, 1500); a single number is both ends
pub fn parse_rate_range(value: &str) -> Option<(i64, i64)> {
    let without_separators = value.replace(',', "");
    let mut numbers = NUMBER
        .find_iter(&without_separators)
        .filter_map(|m| m.as_str().parse::<i64>().ok());

    let min = numbers.next()?;
    let max = numbers.next().unwrap_or(min);
    Some((min, max))
}

pub async fn promote_preference(
    conn: &mut SqliteConnection,
    user_id: &str,
    preference: &ExtractedPreference,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO user_job_preferences (user_id) VALUES (?) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let kind = preference.preference_type.as_str();

    if let Some(column) = preference_list_column(kind) {
        sqlx::query(&format!(
            "UPDATE user_job_preferences SET {column} = json_insert(COALESCE({column}, '[]'), '$[#]', ?), updated_at = datetime('now') WHERE user_id = ?",
            column = column
        ))
        .bind(&preference.value)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        return Ok(());
    }

    match kind {
        "availability" => {
            if let Some(days) = parse_availability_days(&preference.value) {
                sqlx::query(
                    "UPDATE user_job_preferences SET availability_days_per_week = ?, updated_at = datetime('now') WHERE user_id = ?",
                )
                .bind(days)
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
            }
        }
        "rate" => {
            if let Some((min, max)) = parse_rate_range(&preference.value) {
                sqlx::query(
                    "UPDATE user_job_preferences SET day_rate_min = ?, day_rate_max = ?, updated_at = datetime('now') WHERE user_id = ?",
                )
                .bind(min)
                .bind(max)
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
            }
        }
        other => debug!(preference_type = %other, "Ignoring unknown preference type"),
    }

    Ok(())
}
