// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::companies::validation::CompanyValidator;
use crate::services::{EnrichmentClient, GatewayClient, SerperClient};

/// Database pool, outbound clients and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub gateway: Arc<GatewayClient>,
    pub serper: Arc<SerperClient>,
    pub enrichment: Arc<EnrichmentClient>,
}

impl AppState {
    pub fn new(db: SqlitePool, http: Client, config: AppConfig) -> Self {
        let timeouts = &config.timeouts;
        let gateway = Arc::new(
            GatewayClient::new(http.clone(), config.gateway.clone()).with_timeout(timeouts.gateway),
        );
        let serper = Arc::new(
            SerperClient::new(http.clone(), config.serper_api_key.clone())
                .with_timeout(timeouts.search),
        );
        let enrichment = Arc::new(
            EnrichmentClient::new(http.clone(), config.crawl_service_url.clone())
                .with_timeout(timeouts.crawl),
        );

        Self {
            db,
            config,
            gateway,
            serper,
            enrichment,
        }
    }

    /// The database → AI → web search cascade wired to the live clients
    pub fn company_validator(&self) -> CompanyValidator {
        CompanyValidator::new(self.db.clone(), self.gateway.clone(), self.serper.clone())
    }
}
