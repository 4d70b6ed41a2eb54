use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::models::{AdditionalCompanyInfo, EmployerCompany};
use super::normalize::normalize_company_name;
use crate::common::ApiError;

const COMPANY_COLUMNS: &str = r#"
    id, name, normalized_name, domain, industry, size_range, headquarters,
    linkedin_url, logo_url, description, validated, validated_at, validation_source
"#;

pub struct CompaniesService {
    db: SqlitePool,
}

impl CompaniesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Looks a company up by normalized name or case-insensitive display name
    pub async fn find_by_name(&self, company_name: &str) -> Result<Option<EmployerCompany>, ApiError> {
        let normalized = normalize_company_name(company_name);

        let company = sqlx::query_as::<_, EmployerCompany>(&format!(
            "SELECT {} FROM employer_companies WHERE normalized_name = ? OR LOWER(name) = ? LIMIT 1",
            COMPANY_COLUMNS
        ))
        .bind(&normalized)
        .bind(company_name.to_lowercase())
        .fetch_optional(&self.db)
        .await?;

        Ok(company)
    }

    /// Stores a user-confirmed company, marking it validated
    pub async fn confirm_and_save(
        &self,
        company_name: &str,
        confirmed_domain: &str,
        info: &AdditionalCompanyInfo,
    ) -> Result<i64, ApiError> {
        let normalized = normalize_company_name(company_name);

        let company_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employer_companies (
                name, normalized_name, domain, industry, size_range,
                headquarters, validated, validated_at, validation_source
            )
            VALUES (?, ?, ?, ?, ?, ?, 1, datetime('now'), 'user_confirmed')
            ON CONFLICT (normalized_name) DO UPDATE SET
                domain = COALESCE(excluded.domain, employer_companies.domain),
                industry = COALESCE(excluded.industry, employer_companies.industry),
                size_range = COALESCE(excluded.size_range, employer_companies.size_range),
                headquarters = COALESCE(excluded.headquarters, employer_companies.headquarters),
                validated = 1,
                validated_at = datetime('now')
            RETURNING id
            "#,
        )
        .bind(company_name)
        .bind(&normalized)
        .bind(confirmed_domain)
        .bind(info.industry.as_deref())
        .bind(info.size.as_deref())
        .bind(info.headquarters.as_deref())
        .fetch_one(&self.db)
        .await?;

        info!(
            company_id,
            company = %company_name,
            domain = %confirmed_domain,
            "Company confirmed by user"
        );

        Ok(company_id)
    }
}

/// Returns the employer id for `company_name`, creating the company when unknown
pub async fn find_or_create_employer(
    conn: &mut SqliteConnection,
    company_name: &str,
    industry: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let normalized = normalize_company_name(company_name);

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM employer_companies WHERE LOWER(name) = LOWER(?) OR normalized_name = ? LIMIT 1",
    )
    .bind(company_name)
    .bind(&normalized)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    sqlx::query_scalar(
        r#"
        INSERT INTO employer_companies (name, normalized_name, industry)
        VALUES (?, ?, ?)
        ON CONFLICT (normalized_name) DO UPDATE SET name = employer_companies.name
        RETURNING id
        "#,
    )
    .bind(company_name)
    .bind(&normalized)
    .bind(industry)
    .fetch_one(&mut *conn)
    .await
}

/// Upserts a company promoted from an extraction, taking the extracted display name
pub async fn upsert_extracted_employer(
    conn: &mut SqliteConnection,
    company_name: &str,
    normalized_name: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO employer_companies (name, normalized_name)
        VALUES (?, ?)
        ON CONFLICT (normalized_name) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(company_name)
    .bind(normalized_name)
    .fetch_one(&mut *conn)
    .await
}
