// src/repo/validators.rs

use super::models::{CreateExperience, DeleteExperience, OnboardingRequest, UpdateExperience};
use crate::common::{ValidationResult, Validator};

const MAX_NAME_LEN: usize = 255;
const MAX_SKILLS: usize = 200;

pub struct RepoValidator;

fn check_years(result: &mut ValidationResult, start_year: Option<i64>, end_year: Option<i64>) {
    if let (Some(start), Some(end)) = (start_year, end_year) {
        if end < start {
            result.add_error("endYear", "End year cannot be before start year");
        }
    }
}

impl Validator<CreateExperience> for RepoValidator {
    fn validate(&self, data: &CreateExperience) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("userId", data.user_id.as_deref());
        result.require("companyName", data.company_name.as_deref());
        result.require("roleTitle", data.role_title.as_deref());
        result.max_len("companyName", data.company_name.as_deref(), MAX_NAME_LEN);
        result.max_len("roleTitle", data.role_title.as_deref(), MAX_NAME_LEN);
        check_years(&mut result, data.start_year, data.end_year);

        result
    }
}

impl Validator<UpdateExperience> for RepoValidator {
    fn validate(&self, data: &UpdateExperience) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("userId", data.user_id.as_deref());
        if data.experience_id.is_none() {
            result.add_error("experienceId", "is required");
        }
        result.max_len("companyName", data.company_name.as_deref(), MAX_NAME_LEN);
        result.max_len("roleTitle", data.role_title.as_deref(), MAX_NAME_LEN);
        check_years(&mut result, data.start_year, data.end_year);

        result
    }
}

impl Validator<DeleteExperience> for RepoValidator {
    fn validate(&self, data: &DeleteExperience) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("userId", data.user_id.as_deref());
        if data.experience_id.is_none() {
            result.add_error("experienceId", "is required");
        }

        result
    }
}

impl Validator<OnboardingRequest> for RepoValidator {
    fn validate(&self, data: &OnboardingRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("userId", data.user_id.as_deref());
        if data.skills.len() > MAX_SKILLS {
            result.add_error("skills", "Too many skills");
        }

        result
    }
}
