use super::models::{ConfirmCompanyResponse, ValidateCompanyRequest};
use super::services::CompaniesService;
use super::validators::{CompanyAction, CompanyRequestValidator};
use crate::common::{ApiError, AppState, Validator};
use axum::{extract::Extension, response::IntoResponse, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// POST /api/company/validate - Look a company up, or store the user's confirmation
pub async fn validate_company(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<ValidateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = CompanyRequestValidator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    // Unknown actions were rejected above
    let action = CompanyAction::parse(request.action.as_deref()).unwrap_or_default();
    let company_name = request.company_name.as_deref().unwrap_or_default().trim();

    match action {
        CompanyAction::Validate => {
            info!(
                company = %company_name,
                user_id = request.user_id.as_deref().unwrap_or("anonymous"),
                "Validating company"
            );
            let result = state.company_validator().validate(company_name).await;
            Ok(Json(serde_json::to_value(result).map_err(|e| {
                ApiError::failed("Validation failed", e)
            })?))
        }
        CompanyAction::Confirm => {
            let confirmed_domain = request
                .confirmed_domain
                .as_deref()
                .unwrap_or_default()
                .trim();
            let companies_service = CompaniesService::new(state.db.clone());

            let response = match companies_service
                .confirm_and_save(company_name, confirmed_domain, &request.additional_info)
                .await
            {
                Ok(company_id) => {
                    let enrichment = state.enrichment.clone();
                    let domain = confirmed_domain.to_string();
                    tokio::spawn(async move {
                        let outcome = enrichment.trigger(company_id, &domain).await;
                        if !outcome.success {
                            warn!(company_id, domain = %domain, "Company enrichment not started");
                        }
                    });

                    ConfirmCompanyResponse {
                        success: true,
                        company_id: Some(company_id),
                        error: None,
                    }
                }
                Err(e) => {
                    error!(company = %company_name, error = %e, "Error saving company");
                    ConfirmCompanyResponse {
                        success: false,
                        company_id: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            Ok(Json(serde_json::to_value(response).map_err(|e| {
                ApiError::failed("Validation failed", e)
            })?))
        }
    }
}
