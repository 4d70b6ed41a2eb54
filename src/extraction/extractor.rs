// src/extraction/extractor.rs
//! Pulling profile facts out of a conversation transcript

use async_trait::async_trait;
use tracing::{debug, info};

use super::models::ExtractionResult;
use crate::services::gateway::GatewayError;
use crate::services::{GatewayClient, JsonPrompt};

const EXTRACTION_PROMPT: &str = r#"You extract structured career facts from a conversation between a recruiter and an interim executive.

Only extract facts the candidate states about themselves. Never invent values. Give every item a confidence between 0.0 and 1.0 reflecting how explicitly it was stated.

Respond with valid JSON in exactly this format:
{
  "skills": [
    {"name": "Skill name", "category": "finance|technology|leadership|operations|sales|marketing|hr|other", "proficiency": "beginner|intermediate|advanced|expert", "yearsExperience": 5, "context": "Where they used it", "confidence": 0.9}
  ],
  "companies": [
    {"name": "Company name", "role": "Job title", "roleType": "full-time|interim|fractional|advisory|board", "startYear": 2018, "endYear": 2022, "isCurrent": false, "achievements": ["Achievement"], "teamSize": 12, "confidence": 0.8}
  ],
  "qualifications": [
    {"type": "degree|certification|membership|other", "name": "Qualification name", "institution": "Awarding body", "year": 2010, "confidence": 0.8}
  ],
  "preferences": [
    {"type": "role|location|availability|rate|industry|companyStage", "value": "What they want", "confidence": 0.7}
  ]
}

Omit optional fields you do not know. Use empty arrays when nothing was found."#;

/// Something that can turn a transcript into extracted profile facts
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// Extracts everything the transcript says
    async fn extract(&self, transcript: &str) -> Result<ExtractionResult, GatewayError>;

    /// Extracts only facts not already present in `existing`
    async fn extract_incremental(
        &self,
        transcript: &str,
        existing: &ExtractionResult,
    ) -> Result<ExtractionResult, GatewayError>;
}

#[async_trait]
impl ProfileExtractor for GatewayClient {
    async fn extract(&self, transcript: &str) -> Result<ExtractionResult, GatewayError> {
        let prompt = JsonPrompt {
            system: EXTRACTION_PROMPT,
            user: format!("Extract the candidate's profile from this transcript:\n\n{}", transcript),
            temperature: 0.2,
            max_tokens: Some(2000),
        };

        let result: ExtractionResult = self.complete_json(prompt).await?;
        info!(items = result.item_count(), "Extracted profile from transcript");
        Ok(result)
    }

    async fn extract_incremental(
        &self,
        transcript: &str,
        existing: &ExtractionResult,
    ) -> Result<ExtractionResult, GatewayError> {
        let known = serde_json::to_string(existing)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        debug!(known_items = existing.item_count(), "Running incremental extraction");

        let prompt = JsonPrompt {
            system: EXTRACTION_PROMPT,
            user: format!(
                "We already know this about the candidate:\n{}\n\nExtract only NEW facts from this latest part of the conversation. Do not repeat anything already known:\n\n{}",
                known, transcript
            ),
            temperature: 0.2,
            max_tokens: Some(1500),
        };

        let result: ExtractionResult = self.complete_json(prompt).await?;
        info!(items = result.item_count(), "Extracted new profile facts");
        Ok(result)
    }
}
