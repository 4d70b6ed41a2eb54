// src/companies/validation.rs
//! The company validation cascade: database, then AI knowledge, then web
//! search, then ask the user.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::models::{
    AiCompanyAnswer, CompanyValidationResult, EmployerCompany, ValidatedCompany,
    ValidationSource,
};
use super::normalize::{extract_domain, normalize_company_name};
use super::services::CompaniesService;
use crate::services::gateway::GatewayError;
use crate::services::serper::{SearchError, SearchResponse};
use crate::services::{GatewayClient, JsonPrompt, SerperClient};

const VALIDATED_CONFIDENCE: f64 = 0.95;
const UNVALIDATED_CONFIDENCE: f64 = 0.7;
const AI_ACCEPT_CONFIDENCE: f64 = 0.7;
const AI_KNOWN_CONFIDENCE: f64 = 0.5;
const KNOWLEDGE_GRAPH_CONFIDENCE: f64 = 0.85;
const ORGANIC_CONFIDENCE: f64 = 0.6;
const SEARCH_RESULTS: u32 = 5;

const COMPANY_LOOKUP_PROMPT: &str = r#"You are a company information lookup assistant. Given a company name, provide accurate information about it.

Always respond with valid JSON in this exact format:
{
  "known": true/false,
  "confidence": 0.0-1.0,
  "name": "Official company name",
  "domain": "company.com (without https://)",
  "industry": "Industry sector",
  "headquarters": "City, Country",
  "size": "Company size estimate (e.g., '1000-5000 employees')",
  "description": "One sentence about what they do"
}

If you're not confident about a company, set known=false and confidence=0."#;

/// Something that can tell us about a company from what it already knows
#[async_trait]
pub trait CompanyKnowledge: Send + Sync {
    async fn lookup_company(&self, company_name: &str) -> CompanyValidationResult;
}

/// Something that can find a company's website on the open web
#[async_trait]
pub trait CompanySearch: Send + Sync {
    async fn search_company(&self, company_name: &str) -> CompanyValidationResult;
}

#[async_trait]
impl CompanyKnowledge for GatewayClient {
    async fn lookup_company(&self, company_name: &str) -> CompanyValidationResult {
        let prompt = JsonPrompt {
            system: COMPANY_LOOKUP_PROMPT,
            user: format!(
                "What do you know about the company \"{}\"? Provide their official website domain and key info.",
                company_name
            ),
            temperature: 0.1,
            max_tokens: Some(500),
        };

        let answer = self.complete_json::<AiCompanyAnswer>(prompt).await;
        interpret_ai_answer(company_name, answer)
    }
}

#[async_trait]
impl CompanySearch for SerperClient {
    async fn search_company(&self, company_name: &str) -> CompanyValidationResult {
        let query = format!("{} company official website", company_name);
        let response = self.search(&query, SEARCH_RESULTS).await;
        interpret_search(company_name, response)
    }
}

/// Maps a stored company onto a validation result
pub fn from_database(company: EmployerCompany) -> CompanyValidationResult {
    let validated = company.is_validated();
    let question = (!validated).then(|| {
        format!(
            "I have {} in our records with website {}. Is that correct?",
            company.name,
            company.domain.as_deref().unwrap_or("unknown")
        )
    });

    CompanyValidationResult {
        found: true,
        source: ValidationSource::Database,
        suggested_url: company.domain.clone(),
        needs_confirmation: !validated,
        confidence: if validated {
            VALIDATED_CONFIDENCE
        } else {
            UNVALIDATED_CONFIDENCE
        },
        confirmation_question: question,
        company: Some(ValidatedCompany {
            id: Some(company.id),
            normalized_name: company
                .normalized_name
                .unwrap_or_else(|| normalize_company_name(&company.name)),
            name: company.name,
            domain: company.domain,
            industry: company.industry,
            size: company.size_range,
            headquarters: company.headquarters,
            linkedin_url: company.linkedin_url,
            description: company.description,
            logo: company.logo_url,
            validated,
        }),
    }
}

/// Maps the gateway's answer (or failure) onto a validation result
pub fn interpret_ai_answer(
    company_name: &str,
    answer: Result<AiCompanyAnswer, GatewayError>,
) -> CompanyValidationResult {
    let answer = match answer {
        Ok(answer) => answer,
        Err(GatewayError::NotConfigured) => return CompanyValidationResult::not_found(0.0, None),
        Err(e) => {
            error!(company = %company_name, error = %e, "AI company lookup error");
            return CompanyValidationResult::not_found(0.0, None);
        }
    };

    if !answer.known || answer.confidence < AI_KNOWN_CONFIDENCE {
        return CompanyValidationResult::not_found(
            answer.confidence,
            Some(format!(
                "I'm not sure about \"{}\". Can you tell me their website?",
                company_name
            )),
        );
    }

    let name = answer
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| company_name.to_string());
    let question = format!(
        "You mentioned {}. I believe their website is {} - is that right?",
        company_name,
        answer.domain.as_deref().unwrap_or("unknown")
    );

    CompanyValidationResult::unconfirmed(
        ValidationSource::AiKnowledge,
        ValidatedCompany {
            id: None,
            normalized_name: normalize_company_name(&name),
            name,
            domain: answer.domain,
            industry: answer.industry,
            size: answer.size,
            headquarters: answer.headquarters,
            description: answer.description,
            ..Default::default()
        },
        answer.confidence,
        question,
    )
}

/// Maps a web search response (or failure) onto a validation result
pub fn interpret_search(
    company_name: &str,
    response: Result<SearchResponse, SearchError>,
) -> CompanyValidationResult {
    let response = match response {
        Ok(response) => response,
        Err(SearchError::NotConfigured) => {
            return CompanyValidationResult::not_found(
                0.0,
                Some(format!(
                    "I don't have information about \"{}\". What's their website?",
                    company_name
                )),
            );
        }
        Err(e) => {
            error!(company = %company_name, error = %e, "Web search error");
            return CompanyValidationResult::not_found(0.0, None);
        }
    };

    let normalized_name = normalize_company_name(company_name);

    if let Some(graph) = response.knowledge_graph {
        if let Some(website) = graph.website.as_deref().filter(|w| !w.is_empty()) {
            let domain = extract_domain(website);
            let question = format!(
                "You mentioned {}. Their website is {} - is that right?",
                company_name, domain
            );
            return CompanyValidationResult::unconfirmed(
                ValidationSource::WebSearch,
                ValidatedCompany {
                    name: graph.title.unwrap_or_else(|| company_name.to_string()),
                    normalized_name,
                    domain: Some(domain),
                    description: graph.description,
                    ..Default::default()
                },
                KNOWLEDGE_GRAPH_CONFIDENCE,
                question,
            );
        }
    }

    let Some(top) = response.organic.into_iter().next() else {
        return CompanyValidationResult::not_found(
            0.0,
            Some(format!(
                "I couldn't find \"{}\" online. Can you tell me their website?",
                company_name
            )),
        );
    };

    let domain = extract_domain(&top.link);
    let question = format!("I found {} at {}. Is that their website?", company_name, domain);

    CompanyValidationResult::unconfirmed(
        ValidationSource::WebSearch,
        ValidatedCompany {
            name: company_name.to_string(),
            normalized_name,
            domain: Some(domain),
            description: top.snippet,
            ..Default::default()
        },
        ORGANIC_CONFIDENCE,
        question,
    )
}

/// Runs the cascade against the database and the outside sources
#[derive(Clone)]
pub struct CompanyValidator {
    db: SqlitePool,
    knowledge: Arc<dyn CompanyKnowledge>,
    search: Arc<dyn CompanySearch>,
}

impl CompanyValidator {
    pub fn new(
        db: SqlitePool,
        knowledge: Arc<dyn CompanyKnowledge>,
        search: Arc<dyn CompanySearch>,
    ) -> Self {
        Self {
            db,
            knowledge,
            search,
        }
    }

    /// Step 1; database errors count as a miss
    pub async fn check_database(&self, company_name: &str) -> Option<CompanyValidationResult> {
        match CompaniesService::new(self.db.clone())
            .find_by_name(company_name)
            .await
        {
            Ok(found) => found.map(from_database),
            Err(e) => {
                warn!(company = %company_name, error = %e, "Database company check error");
                None
            }
        }
    }

    pub async fn validate(&self, company_name: &str) -> CompanyValidationResult {
        if let Some(result) = self.check_database(company_name).await {
            debug!(company = %company_name, "Company found in database");
            return result;
        }

        let ai_result = self.knowledge.lookup_company(company_name).await;
        if ai_result.found && ai_result.confidence >= AI_ACCEPT_CONFIDENCE {
            info!(company = %company_name, confidence = ai_result.confidence, "Company known to AI");
            return ai_result;
        }

        let web_result = self.search.search_company(company_name).await;
        if web_result.found {
            info!(company = %company_name, "Company found via web search");
            return web_result;
        }

        info!(company = %company_name, "Company not recognized, asking user");
        CompanyValidationResult::not_found(
            0.0,
            Some(format!(
                "I don't recognize \"{}\". Could you spell out their website for me?",
                company_name
            )),
        )
    }
}
