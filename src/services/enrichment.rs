// src/services/enrichment.rs
//! Triggers a background crawl of a confirmed company's website

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// The crawl service only queues the job, so it should answer quickly
pub const CRAWL_TRIGGER_TIMEOUT: Duration = Duration::from_secs(10);

const EXTRACT_FIELDS: [&str; 6] = [
    "description",
    "industry",
    "size",
    "headquarters",
    "linkedin",
    "logo",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CrawlRequest<'a> {
    url: String,
    company_id: i64,
    extract_fields: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CrawlResponse {
    job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl EnrichmentOutcome {
    fn skipped() -> Self {
        Self {
            success: false,
            job_id: None,
        }
    }
}

#[derive(Debug)]
pub struct EnrichmentClient {
    client: Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl EnrichmentClient {
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url,
            timeout: CRAWL_TRIGGER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Asks the crawl service to scrape `https://{domain}`; never fails, only reports
    pub async fn trigger(&self, company_id: i64, domain: &str) -> EnrichmentOutcome {
        let Some(base_url) = self.base_url.as_deref() else {
            return EnrichmentOutcome::skipped();
        };

        let request = CrawlRequest {
            url: format!("https://{}", domain),
            company_id,
            extract_fields: &EXTRACT_FIELDS,
        };

        let response = match self
            .client
            .post(format!("{}/crawl", base_url.trim_end_matches('/')))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, timed_out = e.is_timeout(), company_id, domain = %domain, "Company enrichment error");
                return EnrichmentOutcome::skipped();
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), company_id, "Crawl service rejected enrichment");
            return EnrichmentOutcome::skipped();
        }

        let job_id = response
            .json::<CrawlResponse>()
            .await
            .ok()
            .and_then(|r| r.job_id);

        info!(company_id, domain = %domain, job_id = ?job_id, "Company enrichment triggered");

        EnrichmentOutcome {
            success: true,
            job_id,
        }
    }
}
