// src/jobs/validators.rs

use super::models::*;
use crate::common::{ValidationResult, Validator};

// ============================================================================
// Job Validators
// ============================================================================

const MAX_TITLE_LEN: usize = 255;
const MAX_COMPANY_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 50_000;

pub struct JobValidator;

impl Validator<CreateJob> for JobValidator {
    fn validate(&self, data: &CreateJob) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Validate title
        if data.title.trim().is_empty() {
            result.add_error("title", "Job title is required");
        } else if data.title.chars().count() > MAX_TITLE_LEN {
            result.add_error("title", "Job title must be less than 255 characters");
        }

        if data.company_name.trim().is_empty() {
            result.add_error("company_name", "Company name is required");
        }
        result.max_len("company_name", Some(&data.company_name), MAX_COMPANY_LEN);

        if data.url.trim().is_empty() {
            result.add_error("url", "Job URL is required");
        } else if !is_http_url(&data.url) {
            result.add_error("url", "URL must start with http:// or https://");
        }

        result.max_len(
            "full_description",
            data.full_description.as_deref(),
            MAX_DESCRIPTION_LEN,
        );
        validate_salary(&mut result, data.salary_min, data.salary_max);
        validate_confidence(&mut result, data.classification_confidence);

        result
    }
}

impl Validator<UpdateJob> for JobValidator {
    fn validate(&self, data: &UpdateJob) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                result.add_error("title", "Job title cannot be empty");
            } else if title.chars().count() > MAX_TITLE_LEN {
                result.add_error("title", "Job title must be less than 255 characters");
            }
        }

        if let Some(company_name) = &data.company_name {
            if company_name.trim().is_empty() {
                result.add_error("company_name", "Company name cannot be empty");
            }
        }
        result.max_len("company_name", data.company_name.as_deref(), MAX_COMPANY_LEN);

        if let Some(url) = &data.url {
            if !is_http_url(url) {
                result.add_error("url", "URL must start with http:// or https://");
            }
        }

        result.max_len(
            "full_description",
            data.full_description.as_deref(),
            MAX_DESCRIPTION_LEN,
        );
        validate_salary(&mut result, data.salary_min, data.salary_max);
        validate_confidence(&mut result, data.classification_confidence);

        result
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn validate_salary(result: &mut ValidationResult, min: Option<i64>, max: Option<i64>) {
    if min.map(|m| m < 0).unwrap_or(false) {
        result.add_error("salary_min", "Minimum salary cannot be negative");
    }
    if max.map(|m| m < 0).unwrap_or(false) {
        result.add_error("salary_max", "Maximum salary cannot be negative");
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            result.add_error(
                "salary_range",
                "Minimum salary cannot be greater than maximum salary",
            );
        }
    }
}

fn validate_confidence(result: &mut ValidationResult, confidence: Option<f64>) {
    if let Some(c) = confidence {
        if !(0.0..=1.0).contains(&c) {
            result.add_error(
                "classification_confidence",
                "Classification confidence must be between 0 and 1",
            );
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
