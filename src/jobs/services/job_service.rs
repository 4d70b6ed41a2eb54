use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use tracing::{debug, error, info};

use crate::common::config::split_list;
use crate::common::error::ApiError;
use crate::common::helpers::to_json_array;
use crate::common::ids::{generate_job_id, slug_suffix, slugify};
use crate::jobs::models::*;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const FEATURED_JOBS: i64 = 6;
pub const MAX_SLUG_LOOKUP: usize = 10;

const JOB_COLUMNS: &str = r#"
    id, slug, title, company_name, company_domain, location, city, workplace_type,
    employment_type, compensation, posted_date, updated_date, is_interim, is_fractional,
    is_remote, is_active, classification_confidence, skills_required, seniority_level,
    role_category, salary_min, salary_max, salary_currency, description_snippet,
    full_description, requirements, responsibilities, benefits, qualifications,
    about_company, about_team, hours_per_week, url, external_id
"#;

const SUMMARY_COLUMNS: &str = r#"
    id, slug, title, company_name, company_domain, location, city, is_remote,
    is_fractional, is_interim, workplace_type, compensation, role_category,
    seniority_level, skills_required, posted_date, description_snippet
"#;

const NEWEST_FIRST: &str = "ORDER BY posted_date IS NULL, posted_date DESC";

/// Compensation text that starts with an optional currency sign and a digit
static DAY_RATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[£$€]?[0-9]").unwrap());

/// A bound value for a dynamically assembled WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Text(String),
    Int(i64),
}

/// Builds the WHERE clause (starting with ` WHERE`) for the job board filter
pub fn build_job_filter(filter: &JobFilter) -> (String, Vec<FilterArg>) {
    let mut sql = " WHERE is_active = 1".to_string();
    let mut args = Vec::new();

    if let Some(title) = non_blank(&filter.title) {
        sql.push_str(" AND title LIKE ?");
        args.push(FilterArg::Text(format!("%{}%", title)));
    }

    if let Some(location) = non_blank(&filter.location) {
        sql.push_str(" AND (location LIKE ? OR city LIKE ?)");
        let pattern = format!("%{}%", location);
        args.push(FilterArg::Text(pattern.clone()));
        args.push(FilterArg::Text(pattern));
    }

    if let Some(is_fractional) = filter.is_fractional {
        sql.push_str(" AND is_fractional = ?");
        args.push(FilterArg::Int(is_fractional as i64));
    }

    if let Some(is_interim) = filter.is_interim {
        sql.push_str(" AND is_interim = ?");
        args.push(FilterArg::Int(is_interim as i64));
    }

    if let Some(seniority) = non_blank(&filter.seniority) {
        sql.push_str(" AND LOWER(seniority_level) = LOWER(?)");
        args.push(FilterArg::Text(seniority.to_string()));
    }

    if let Some(role_category) = non_blank(&filter.role_category) {
        sql.push_str(" AND LOWER(role_category) = LOWER(?)");
        args.push(FilterArg::Text(role_category.to_string()));
    }

    match filter.remote {
        Some(true) => sql.push_str(" AND (is_remote = 1 OR workplace_type = 'Remote')"),
        Some(false) => sql.push_str(
            " AND COALESCE(is_remote, 0) = 0 AND COALESCE(workplace_type, '') != 'Remote'",
        ),
        None => {}
    }

    let skills = filter
        .skills
        .as_deref()
        .map(|s| split_list(s, false))
        .unwrap_or_default();
    if !skills.is_empty() {
        let clauses = vec!["skills_required LIKE ?"; skills.len()].join(" OR ");
        sql.push_str(&format!(" AND ({})", clauses));
        for skill in skills {
            args.push(FilterArg::Text(format!("%\"{}\"%", skill)));
        }
    }

    (sql, args)
}

/// Clamps the requested page to `1..=100` rows and a non-negative offset
pub fn page_bounds(filter: &JobFilter) -> (i64, i64) {
    let limit = filter
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = filter.offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Mean of the digits in each day-rate-looking compensation, rounded
pub fn average_day_rate<'a>(compensations: impl IntoIterator<Item = &'a str>) -> Option<i64> {
    let rates: Vec<f64> = compensations
        .into_iter()
        .filter(|c| DAY_RATE.is_match(c))
        .filter_map(|c| {
            let digits: String = c.chars().filter(|ch| ch.is_ascii_digit()).collect();
            digits.parse::<i64>().ok()
        })
        .map(|rate| rate as f64)
        .collect();

    if rates.is_empty() {
        return None;
    }

    Some((rates.iter().sum::<f64>() / rates.len() as f64).round() as i64)
}

/// Slugs from a `{ "slugs": [...] }` body; anything but a non-empty array yields none
pub fn requested_slugs(slugs: Option<&serde_json::Value>) -> Vec<String> {
    slugs
        .and_then(|v| v.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str())
                .take(MAX_SLUG_LOOKUP)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn bool_flag(value: Option<bool>) -> Option<i64> {
    value.map(|v| v as i64)
}

pub struct JobService {
    db: SqlitePool,
}

impl JobService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Active jobs matching the board filter, newest first
    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<JobListResponse, ApiError> {
        let (where_sql, args) = build_job_filter(filter);
        let (limit, offset) = page_bounds(filter);

        let count_sql = format!("SELECT COUNT(*) FROM jobs{}", where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_query = match arg {
                FilterArg::Text(v) => count_query.bind(v.clone()),
                FilterArg::Int(v) => count_query.bind(*v),
            };
        }
        let total = count_query.fetch_one(&self.db).await?;

        let list_sql = format!(
            "SELECT {} FROM jobs{} {} LIMIT ? OFFSET ?",
            SUMMARY_COLUMNS, where_sql, NEWEST_FIRST
        );
        let mut list_query = sqlx::query_as::<_, JobSummary>(&list_sql);
        for arg in &args {
            list_query = match arg {
                FilterArg::Text(v) => list_query.bind(v.clone()),
                FilterArg::Int(v) => list_query.bind(*v),
            };
        }
        let jobs = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        debug!(
            job_count = jobs.len(),
            total = total,
            limit = limit,
            offset = offset,
            "Loaded job board page"
        );

        Ok(JobListResponse {
            jobs,
            pagination: Pagination {
                limit,
                offset,
                total,
            },
        })
    }

    pub async fn featured_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        let jobs = sqlx::query_as::<_, JobSummary>(&format!(
            "SELECT {} FROM jobs WHERE is_active = 1 AND is_interim = 1 {} LIMIT ?",
            SUMMARY_COLUMNS, NEWEST_FIRST
        ))
        .bind(FEATURED_JOBS)
        .fetch_all(&self.db)
        .await?;

        Ok(jobs)
    }

    pub async fn stats(&self) -> Result<JobStats, ApiError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs WHERE is_active = 1 AND is_interim = 1",
        )
        .fetch_one(&self.db)
        .await?;

        let london_jobs: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs WHERE is_active = 1 AND LOWER(location) LIKE '%london%'",
        )
        .fetch_one(&self.db)
        .await?;

        let remote_jobs: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs WHERE is_active = 1 AND (is_remote = 1 OR workplace_type = 'Remote')",
        )
        .fetch_one(&self.db)
        .await?;

        let compensations: Vec<String> = sqlx::query_scalar(
            "SELECT compensation FROM jobs WHERE is_active = 1 AND compensation IS NOT NULL",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(JobStats {
            total,
            london_jobs,
            remote_jobs,
            avg_day_rate: average_day_rate(compensations.iter().map(String::as_str)),
        })
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Job, ApiError> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE slug = ? AND is_active = 1",
            JOB_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", slug)))
    }

    pub async fn get_by_id(&self, job_id: &str) -> Result<Job, ApiError> {
        sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS))
            .bind(job_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))
    }

    /// Active jobs for up to ten slugs, in no particular order
    pub async fn jobs_by_slugs(&self, slugs: &[String]) -> Result<Vec<JobCard>, ApiError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; slugs.len()].join(", ");
        let sql = format!(
            "SELECT slug, title, company_name AS company, location, is_remote, compensation \
             FROM jobs WHERE slug IN ({}) AND is_active = 1",
            placeholders
        );

        let mut query = sqlx::query_as::<_, JobCard>(&sql);
        for slug in slugs {
            query = query.bind(slug);
        }

        Ok(query.fetch_all(&self.db).await?)
    }

    /// Everything the company page needs for one domain
    pub async fn company_jobs(&self, domain: &str) -> Result<CompanyJobsResponse, ApiError> {
        let jobs = sqlx::query_as::<_, JobSummary>(&format!(
            "SELECT {} FROM jobs WHERE company_domain = ? AND is_active = 1 {}",
            SUMMARY_COLUMNS, NEWEST_FIRST
        ))
        .bind(domain)
        .fetch_all(&self.db)
        .await?;

        let Some(first) = jobs.first() else {
            return Err(ApiError::NotFound(format!("No jobs found for {}", domain)));
        };
        let name = first.company_name.clone();

        let brand = sqlx::query_as::<_, CompanyBrand>(
            r#"SELECT domain, description, logo_url, colors, founded, employees,
                      city, country, industries, slogan, socials
               FROM company_brands WHERE domain = ? LIMIT 1"#,
        )
        .bind(domain)
        .fetch_optional(&self.db)
        .await?;

        let stats = company_job_stats(&jobs);

        Ok(CompanyJobsResponse {
            name,
            domain: domain.to_string(),
            jobs,
            stats,
            brand,
        })
    }

    // ========================================================================
    // Admin writes
    // ========================================================================

    pub async fn create_job(&self, request: CreateJob) -> Result<Job, ApiError> {
        let job_id = generate_job_id();
        let slug = match request.slug.as_deref().map(slugify).filter(|s| !s.is_empty()) {
            Some(slug) => {
                if self.slug_exists(&slug).await? {
                    return Err(ApiError::BadRequest(format!("Slug already in use: {}", slug)));
                }
                slug
            }
            None => {
                self.unique_slug(&format!("{} {}", request.title, request.company_name))
                    .await?
            }
        };
        let external_id = request
            .external_id
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| job_id.clone());

        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, slug, title, company_name, company_domain, location, city, workplace_type,
                employment_type, compensation, posted_date, updated_date, is_interim, is_fractional,
                is_remote, is_active, classification_confidence, skills_required, seniority_level,
                role_category, salary_min, salary_max, salary_currency, description_snippet,
                full_description, requirements, responsibilities, benefits, qualifications,
                about_company, about_team, hours_per_week, url, external_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(?, datetime('now')), datetime('now'),
                    ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job_id)
        .bind(&slug)
        .bind(request.title.trim())
        .bind(request.company_name.trim())
        .bind(&request.company_domain)
        .bind(&request.location)
        .bind(&request.city)
        .bind(&request.workplace_type)
        .bind(&request.employment_type)
        .bind(&request.compensation)
        .bind(&request.posted_date)
        .bind(request.is_interim.unwrap_or(true) as i64)
        .bind(request.is_fractional.unwrap_or(false) as i64)
        .bind(request.is_remote.unwrap_or(false) as i64)
        .bind(request.is_active.unwrap_or(true) as i64)
        .bind(request.classification_confidence)
        .bind(to_json_array(request.skills_required.as_deref()))
        .bind(&request.seniority_level)
        .bind(&request.role_category)
        .bind(request.salary_min)
        .bind(request.salary_max)
        .bind(&request.salary_currency)
        .bind(&request.description_snippet)
        .bind(&request.full_description)
        .bind(to_json_array(request.requirements.as_deref()))
        .bind(to_json_array(request.responsibilities.as_deref()))
        .bind(to_json_array(request.benefits.as_deref()))
        .bind(to_json_array(request.qualifications.as_deref()))
        .bind(&request.about_company)
        .bind(&request.about_team)
        .bind(&request.hours_per_week)
        .bind(request.url.trim())
        .bind(&external_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, job_id = %job_id, slug = %slug, "Database error creating job");
            ApiError::DatabaseError(e)
        })?;

        info!(job_id = %job_id, slug = %slug, "Job created");

        self.get_by_id(&job_id).await
    }

    pub async fn update_job(&self, job_id: &str, request: UpdateJob) -> Result<Job, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                title = COALESCE(?, title),
                company_name = COALESCE(?, company_name),
                url = COALESCE(?, url),
                company_domain = COALESCE(?, company_domain),
                location = COALESCE(?, location),
                city = COALESCE(?, city),
                workplace_type = COALESCE(?, workplace_type),
                employment_type = COALESCE(?, employment_type),
                compensation = COALESCE(?, compensation),
                posted_date = COALESCE(?, posted_date),
                is_interim = COALESCE(?, is_interim),
                is_fractional = COALESCE(?, is_fractional),
                is_remote = COALESCE(?, is_remote),
                is_active = COALESCE(?, is_active),
                classification_confidence = COALESCE(?, classification_confidence),
                skills_required = COALESCE(?, skills_required),
                seniority_level = COALESCE(?, seniority_level),
                role_category = COALESCE(?, role_category),
                salary_min = COALESCE(?, salary_min),
                salary_max = COALESCE(?, salary_max),
                salary_currency = COALESCE(?, salary_currency),
                description_snippet = COALESCE(?, description_snippet),
                full_description = COALESCE(?, full_description),
                requirements = COALESCE(?, requirements),
                responsibilities = COALESCE(?, responsibilities),
                benefits = COALESCE(?, benefits),
                qualifications = COALESCE(?, qualifications),
                about_company = COALESCE(?, about_company),
                about_team = COALESCE(?, about_team),
                hours_per_week = COALESCE(?, hours_per_week),
                updated_date = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(request.title.as_deref().map(str::trim))
        .bind(request.company_name.as_deref().map(str::trim))
        .bind(request.url.as_deref().map(str::trim))
        .bind(&request.company_domain)
        .bind(&request.location)
        .bind(&request.city)
        .bind(&request.workplace_type)
        .bind(&request.employment_type)
        .bind(&request.compensation)
        .bind(&request.posted_date)
        .bind(bool_flag(request.is_interim))
        .bind(bool_flag(request.is_fractional))
        .bind(bool_flag(request.is_remote))
        .bind(bool_flag(request.is_active))
        .bind(request.classification_confidence)
        .bind(to_json_array(request.skills_required.as_deref()))
        .bind(&request.seniority_level)
        .bind(&request.role_category)
        .bind(request.salary_min)
        .bind(request.salary_max)
        .bind(&request.salary_currency)
        .bind(&request.description_snippet)
        .bind(&request.full_description)
        .bind(to_json_array(request.requirements.as_deref()))
        .bind(to_json_array(request.responsibilities.as_deref()))
        .bind(to_json_array(request.benefits.as_deref()))
        .bind(to_json_array(request.qualifications.as_deref()))
        .bind(&request.about_company)
        .bind(&request.about_team)
        .bind(&request.hours_per_week)
        .bind(job_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Job not found: {}", job_id)));
        }

        info!(job_id = %job_id, "Job updated");

        self.get_by_id(job_id).await
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(job_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Job not found: {}", job_id)));
        }

        info!(job_id = %job_id, "Job deleted");
        Ok(())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Slug from `text`, suffixed with random characters until unused
    async fn unique_slug(&self, text: &str) -> Result<String, ApiError> {
        let base = match slugify(text) {
            s if s.is_empty() => "job".to_string(),
            s => s,
        };

        let mut candidate = base.clone();
        while self.slug_exists(&candidate).await? {
            candidate = format!("{}-{}", base, slug_suffix());
        }
        Ok(candidate)
    }
}

/// Distinct role categories and locations (city preferred) in first-seen order
pub fn company_job_stats(jobs: &[JobSummary]) -> CompanyJobStats {
    let mut seen_categories = BTreeSet::new();
    let mut seen_locations = BTreeSet::new();
    let mut role_categories = Vec::new();
    let mut locations = Vec::new();

    for job in jobs {
        if let Some(category) = job.role_category.as_deref().filter(|c| !c.is_empty()) {
            if seen_categories.insert(category.to_string()) {
                role_categories.push(category.to_string());
            }
        }

        let place = job
            .city
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(job.location.as_deref().filter(|l| !l.is_empty()));
        if let Some(place) = place {
            if seen_locations.insert(place.to_string()) {
                locations.push(place.to_string());
            }
        }
    }

    CompanyJobStats {
        total_jobs: jobs.len(),
        role_categories,
        locations,
    }
}
