use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where a validation answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSource {
    Database,
    AiKnowledge,
    WebSearch,
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedCompany {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub normalized_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub validated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyValidationResult {
    pub found: bool,
    pub source: ValidationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<ValidatedCompany>,
    pub needs_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_url: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_question: Option<String>,
}

impl CompanyValidationResult {
    /// A miss that still needs the user to supply the company
    pub fn not_found(confidence: f64, question: Option<String>) -> Self {
        Self {
            found: false,
            source: ValidationSource::NotFound,
            company: None,
            needs_confirmation: true,
            suggested_url: None,
            confidence,
            confirmation_question: question,
        }
    }

    /// A hit from an outside source, always awaiting user confirmation
    pub fn unconfirmed(
        source: ValidationSource,
        company: ValidatedCompany,
        confidence: f64,
        question: String,
    ) -> Self {
        Self {
            found: true,
            source,
            suggested_url: company.domain.clone(),
            company: Some(company),
            needs_confirmation: true,
            confidence,
            confirmation_question: Some(question),
        }
    }
}

/// Row of `employer_companies`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployerCompany {
    pub id: i64,
    pub name: String,
    pub normalized_name: Option<String>,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub size_range: Option<String>,
    pub headquarters: Option<String>,
    pub linkedin_url: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub validated: i64,
    pub validated_at: Option<String>,
    pub validation_source: Option<String>,
}

impl EmployerCompany {
    pub fn is_validated(&self) -> bool {
        self.validated != 0
    }
}

/// What the gateway model says about a company
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiCompanyAnswer {
    #[serde(default)]
    pub known: bool,
    #[serde(default)]
    pub confidence: f64,
    pub name: Option<String>,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub headquarters: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
}

/// Optional details stored alongside a user-confirmed domain
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdditionalCompanyInfo {
    pub industry: Option<String>,
    pub size: Option<String>,
    pub headquarters: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCompanyRequest {
    pub company_name: Option<String>,
    pub action: Option<String>,
    pub confirmed_domain: Option<String>,
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub additional_info: AdditionalCompanyInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCompanyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
