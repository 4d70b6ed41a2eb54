// src/extraction/validators.rs

use super::models::{ConfirmAction, ConfirmRequest, ExtractRequest};
use crate::common::{ValidationResult, Validator};

// ============================================================================
// Extraction Validators
// ============================================================================

const MAX_TRANSCRIPT_LEN: usize = 200_000;

pub struct ExtractionValidator;

impl Validator<ExtractRequest> for ExtractionValidator {
    fn validate(&self, data: &ExtractRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.transcript.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            result.add_error("transcript", "Transcript required");
        }
        result.max_len("transcript", data.transcript.as_deref(), MAX_TRANSCRIPT_LEN);

        result
    }
}

impl Validator<ConfirmRequest> for ExtractionValidator {
    fn validate(&self, data: &ConfirmRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.item_id.is_none() {
            result.add_error("itemId", "is required");
        }
        result.require("userId", data.user_id.as_deref());

        match data.action.as_deref() {
            None | Some("") => result.add_error("action", "is required"),
            Some(action) if ConfirmAction::parse(action).is_none() => {
                result.add_error("action", "must be confirm, reject, or edit")
            }
            Some(_) => {}
        }

        result
    }
}
