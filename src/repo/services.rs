// src/repo/services.rs

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::info;

use super::models::*;
use crate::common::helpers::to_json_array;
use crate::common::ApiError;
use crate::companies::services::find_or_create_employer;
use crate::extraction::services::ExtractionService;

const DEFAULT_ROLE_TYPE: &str = "full-time";
const DEFAULT_ONBOARDING_ROLE: &str = "Executive";

static DAY_RATE_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"£(\d+)-(\d+)").unwrap());
static DAY_RATE_FLOOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"£(\d+)\+").unwrap());

const EXPERIENCE_SUMMARY_COLUMNS: &str =
    "id, role_title, company_name_raw, start_year, end_year, is_current, industry";

/// Profile completeness out of 100
pub fn completeness(skills: usize, experiences: usize, qualifications: usize, has_preferences: bool) -> u32 {
    let skills = (skills as u32).saturating_mul(5).min(30);
    let experiences = (experiences as u32).saturating_mul(10).min(30);
    let qualifications = (qualifications as u32).saturating_mul(10).min(20);
    let preferences = if has_preferences { 20 } else { 0 };

    skills + experiences + qualifications + preferences
}

/// Onboarding day-rate choices: "£800-1000" → (800, 1000), "£1500+" → (1500, none)
pub fn parse_day_rate(day_rate: &str) -> (Option<i64>, Option<i64>) {
    if day_rate.contains('-') {
        if let Some(caps) = DAY_RATE_RANGE.captures(day_rate) {
            return (caps[1].parse().ok(), caps[2].parse().ok());
        }
    } else if day_rate.contains('+') {
        if let Some(caps) = DAY_RATE_FLOOR.captures(day_rate) {
            return (caps[1].parse().ok(), None);
        }
    }

    (None, None)
}

pub struct RepoService {
    db: SqlitePool,
}

impl RepoService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Everything stored for a candidate, with summary stats
    pub async fn get_repo(&self, user_id: &str) -> Result<RepoResponse, ApiError> {
        let skills = sqlx::query_as::<_, UserSkill>(
            r#"
            SELECT us.id, us.user_id, us.skill_id, us.skill_name_raw, us.proficiency_level,
                   us.years_experience, us.context, us.confidence, us.confirmed,
                   us.confirmed_at, us.created_at,
                   s.name AS skill_name, s.category AS skill_category
            FROM user_skills us
            LEFT JOIN skills s ON us.skill_id = s.id
            WHERE us.user_id = ?
            ORDER BY us.confirmed DESC, us.confidence IS NOT NULL, us.confidence DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let experiences = sqlx::query_as::<_, UserExperience>(
            r#"
            SELECT ue.id, ue.user_id, ue.employer_id, ue.company_name_raw, ue.role_title,
                   ue.role_type, ue.start_year, ue.end_year, ue.is_current,
                   COALESCE(ec.industry, ue.industry) AS industry,
                   ue.achievements, ue.team_size, ue.confidence, ue.confirmed,
                   ue.confirmed_at, ue.created_at,
                   ec.name AS company_name, ec.logo_url
            FROM user_experiences ue
            LEFT JOIN employer_companies ec ON ue.employer_id = ec.id
            WHERE ue.user_id = ?
            ORDER BY ue.is_current DESC, ue.end_year IS NOT NULL, ue.end_year DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let qualifications = sqlx::query_as::<_, UserQualification>(
            r#"
            SELECT id, user_id, qualification_type, name, institution, year_obtained,
                   confidence, confirmed, created_at
            FROM user_qualifications
            WHERE user_id = ?
            ORDER BY year_obtained IS NULL, year_obtained DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let preferences = sqlx::query_as::<_, JobPreferences>(
            r#"
            SELECT user_id, role_types, preferred_locations, remote_preference,
                   availability_days_per_week, day_rate_min, day_rate_max,
                   industries_preferred, company_stages, created_at, updated_at
            FROM user_job_preferences
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        let pending_items = ExtractionService::new(self.db.clone())
            .list_pending(user_id)
            .await?;

        let stats = RepoStats {
            total_skills: skills.len(),
            confirmed_skills: skills
                .iter()
                .filter(|s| s.confirmed.unwrap_or(0) != 0)
                .count(),
            total_experiences: experiences.len(),
            pending_count: pending_items.len(),
            completeness: completeness(
                skills.len(),
                experiences.len(),
                qualifications.len(),
                preferences.is_some(),
            ),
        };

        Ok(RepoResponse {
            skills,
            experiences,
            qualifications,
            preferences,
            pending_items,
            stats,
        })
    }

    /// Adds a confirmed experience, creating the employer when it is new
    pub async fn add_experience(
        &self,
        user_id: &str,
        company_name: &str,
        role_title: &str,
        request: &CreateExperience,
    ) -> Result<CreatedExperience, ApiError> {
        let mut tx = self.db.begin().await?;

        let employer_id =
            find_or_create_employer(&mut *tx, company_name, request.industry.as_deref()).await?;

        let experience = sqlx::query_as::<_, ExperienceSummary>(&format!(
            r#"
            INSERT INTO user_experiences (
                user_id, employer_id, company_name_raw, role_title, role_type,
                start_year, end_year, is_current, industry, achievements, confirmed
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
            RETURNING {}
            "#,
            EXPERIENCE_SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(employer_id)
        .bind(company_name)
        .bind(role_title)
        .bind(
            request
                .role_type
                .as_deref()
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_ROLE_TYPE),
        )
        .bind(request.start_year)
        .bind(request.end_year)
        .bind(request.is_current.unwrap_or(false))
        .bind(request.industry.as_deref())
        .bind(to_json_array(request.achievements.as_deref()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            experience_id = experience.id,
            employer_id,
            "Added experience"
        );

        Ok(CreatedExperience {
            experience,
            company_name: company_name.to_string(),
        })
    }

    /// Coalescing update; start and end years are always replaced
    pub async fn update_experience(
        &self,
        user_id: &str,
        experience_id: i64,
        request: &UpdateExperience,
    ) -> Result<ExperienceSummary, ApiError> {
        sqlx::query_as::<_, ExperienceSummary>(&format!(
            r#"
            UPDATE user_experiences
            SET company_name_raw = COALESCE(?, company_name_raw),
                role_title = COALESCE(?, role_title),
                role_type = COALESCE(?, role_type),
                start_year = ?,
                end_year = ?,
                is_current = COALESCE(?, is_current),
                industry = COALESCE(?, industry),
                achievements = COALESCE(?, achievements)
            WHERE id = ? AND user_id = ?
            RETURNING {}
            "#,
            EXPERIENCE_SUMMARY_COLUMNS
        ))
        .bind(request.company_name.as_deref())
        .bind(request.role_title.as_deref())
        .bind(request.role_type.as_deref())
        .bind(request.start_year)
        .bind(request.end_year)
        .bind(request.is_current)
        .bind(request.industry.as_deref())
        .bind(to_json_array(request.achievements.as_deref()))
        .bind(experience_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Experience not found".to_string()))
    }

    pub async fn remove_experience(
        &self,
        user_id: &str,
        experience_id: i64,
    ) -> Result<RemovedExperience, ApiError> {
        let (role_title, company): (Option<String>, Option<String>) = sqlx::query_as(
            "DELETE FROM user_experiences WHERE id = ? AND user_id = ? RETURNING role_title, company_name_raw",
        )
        .bind(experience_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Experience not found".to_string()))?;

        info!(user_id = %user_id, experience_id, "Removed experience");

        Ok(RemovedExperience {
            id: experience_id,
            role_title,
            company,
        })
    }

    /// Stores what the onboarding flow collected in one go
    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        request: &OnboardingRequest,
    ) -> Result<OnboardingSaved, ApiError> {
        let mut tx = self.db.begin().await?;

        for skill in &request.skills {
            sqlx::query(
                r#"
                INSERT INTO user_skills (user_id, skill_name_raw, confirmed)
                VALUES (?, ?, 1)
                ON CONFLICT (user_id, skill_name_raw) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(skill)
            .execute(&mut *tx)
            .await?;
        }

        let mut experiences = 0;
        for experience in &request.experiences {
            let Some(company) = experience.company.as_deref().filter(|c| !c.trim().is_empty()) else {
                continue;
            };
            let role = experience
                .role
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(DEFAULT_ONBOARDING_ROLE);

            sqlx::query(
                "INSERT INTO user_experiences (user_id, company_name_raw, role_title, confirmed) VALUES (?, ?, ?, 1)",
            )
            .bind(user_id)
            .bind(company)
            .bind(role)
            .execute(&mut *tx)
            .await?;
            experiences += 1;
        }

        if let Some(preferences) = &request.preferences {
            let (day_rate_min, day_rate_max) =
                parse_day_rate(preferences.day_rate.as_deref().unwrap_or_default());

            sqlx::query(
                r#"
                INSERT INTO user_job_preferences (user_id, role_types, day_rate_min, day_rate_max)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE SET
                    role_types = excluded.role_types,
                    day_rate_min = excluded.day_rate_min,
                    day_rate_max = excluded.day_rate_max,
                    updated_at = datetime('now')
                "#,
            )
            .bind(user_id)
            .bind(to_json_array(Some(preferences.role_types.as_slice())))
            .bind(day_rate_min)
            .bind(day_rate_max)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let saved = OnboardingSaved {
            skills: request.skills.len(),
            experiences,
            preferences: request.preferences.is_some(),
        };

        info!(
            user_id = %user_id,
            skills = saved.skills,
            experiences = saved.experiences,
            preferences = saved.preferences,
            "Onboarding saved"
        );

        Ok(saved)
    }
}
