use super::models::ValidateCompanyRequest;
use crate::common::{ValidationResult, Validator};

/// What the caller wants done with a company name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompanyAction {
    #[default]
    Validate,
    Confirm,
}

impl CompanyAction {
    /// A missing action means `validate`; anything unknown is rejected
    pub fn parse(action: Option<&str>) -> Option<Self> {
        match action {
            None | Some("") | Some("validate") => Some(CompanyAction::Validate),
            Some("confirm") => Some(CompanyAction::Confirm),
            Some(_) => None,
        }
    }
}

/// Company validation request validator
pub struct CompanyRequestValidator;

impl Validator<ValidateCompanyRequest> for CompanyRequestValidator {
    fn validate(&self, data: &ValidateCompanyRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("companyName", data.company_name.as_deref());
        result.max_len("companyName", data.company_name.as_deref(), 255);

        match CompanyAction::parse(data.action.as_deref()) {
            Some(CompanyAction::Confirm) => {
                result.require("confirmedDomain", data.confirmed_domain.as_deref());
            }
            Some(CompanyAction::Validate) => {}
            None => result.add_error("action", "Invalid action"),
        }

        result
    }
}
