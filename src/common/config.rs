// src/common/config.rs
//! Process configuration read once at start-up

use std::collections::HashSet;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::services::enrichment::CRAWL_TRIGGER_TIMEOUT;
use crate::services::gateway::GATEWAY_TIMEOUT;
use crate::services::serper::SEARCH_TIMEOUT;

pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pydantic.dev/proxy/chat/";
pub const DEFAULT_GATEWAY_MODEL: &str = "gpt-4o-mini";

/// Authentication bypass for local development
#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("DEV_MODE"),
            user_email: env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@test.com".to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Settings for the OpenAI-compatible chat gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// Per-request limits for the outbound HTTP integrations
#[derive(Debug, Clone)]
pub struct OutboundTimeouts {
    pub gateway: Duration,
    pub search: Duration,
    pub crawl: Duration,
}

impl OutboundTimeouts {
    pub fn from_env() -> Self {
        Self {
            gateway: env_secs("GATEWAY_TIMEOUT_SECS", GATEWAY_TIMEOUT),
            search: env_secs("SEARCH_TIMEOUT_SECS", SEARCH_TIMEOUT),
            crawl: env_secs("CRAWL_TIMEOUT_SECS", CRAWL_TRIGGER_TIMEOUT),
        }
    }
}

impl Default for OutboundTimeouts {
    fn default() -> Self {
        Self {
            gateway: GATEWAY_TIMEOUT,
            search: SEARCH_TIMEOUT,
            crawl: CRAWL_TRIGGER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub dev_mode: DevModeConfig,
    pub gateway: GatewayConfig,
    pub serper_api_key: Option<String>,
    pub crawl_service_url: Option<String>,
    pub timeouts: OutboundTimeouts,
    pub reset_db: bool,
    /// Value of the `articles.app` column served by this deployment
    pub app_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let gateway_key = non_empty_var("PYDANTIC_AI_GATEWAY_API_KEY")
            .or_else(|| non_empty_var("PYDANTIC_GATEWAY_API_KEY"));

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://interim.db".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080),
            cors_origins: split_list(
                &env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                false,
            ),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "replace_with_strong_secret".to_string()),
            admin_emails: split_list(&env::var("ADMIN_EMAILS").unwrap_or_default(), true)
                .into_iter()
                .collect(),
            dev_mode: DevModeConfig::from_env(),
            gateway: GatewayConfig {
                url: env::var("GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
                api_key: gateway_key,
                model: env::var("GATEWAY_MODEL")
                    .unwrap_or_else(|_| DEFAULT_GATEWAY_MODEL.to_string()),
            },
            serper_api_key: non_empty_var("SERPER_API_KEY"),
            crawl_service_url: non_empty_var("CRAWL4AI_SERVICE_URL"),
            timeouts: OutboundTimeouts::from_env(),
            reset_db: env_flag("RESET_DB"),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "interim".to_string()),
        }
    }

    /// Offline configuration with every optional integration disabled
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            cors_origins: Vec::new(),
            jwt_secret: "test_secret_key".to_string(),
            admin_emails: ["ops@interim.quest".to_string()].into_iter().collect(),
            dev_mode: DevModeConfig {
                enabled: false,
                user_email: "dev@test.com".to_string(),
            },
            gateway: GatewayConfig {
                url: DEFAULT_GATEWAY_URL.to_string(),
                api_key: None,
                model: DEFAULT_GATEWAY_MODEL.to_string(),
            },
            serper_api_key: None,
            crawl_service_url: None,
            timeouts: OutboundTimeouts::default(),
            reset_db: false,
            app_name: "interim".to_string(),
        }
    }

    /// Logs which optional integrations are active
    pub fn log_summary(&self) {
        info!(
            port = self.port,
            admin_count = self.admin_emails.len(),
            gateway_model = %self.gateway.model,
            gateway_enabled = self.gateway.api_key.is_some(),
            web_search_enabled = self.serper_api_key.is_some(),
            enrichment_enabled = self.crawl_service_url.is_some(),
            gateway_timeout_secs = self.timeouts.gateway.as_secs(),
            "Configuration loaded"
        );
        if self.dev_mode.is_enabled() {
            warn!(
                user_email = %self.dev_mode.user_email,
                "DEV MODE ENABLED - admin authentication is bypassed"
            );
        }
        if self.jwt_secret == "replace_with_strong_secret" {
            warn!("JWT_SECRET is not set; using the placeholder secret");
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Whole seconds from `key`; zero or unparsable values keep the default
fn env_secs(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Splits a comma-separated setting, dropping blanks
pub fn split_list(raw: &str, lowercase: bool) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| if lowercase { s.to_lowercase() } else { s.to_string() })
        .collect()
}
