// src/services/serper.rs
//! Google search through Serper.dev

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search API key not configured")]
    NotConfigured,

    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Search API returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
    pub knowledge_graph: Option<KnowledgeGraph>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub link: String,
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeGraph {
    pub title: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct SerperClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl SerperClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: SERPER_SEARCH_URL.to_string(),
            timeout: SEARCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub async fn search(&self, query: &str, num: u32) -> Result<SearchResponse, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::NotConfigured)?;

        debug!(query = %query, num, "Running web search");

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .timeout(self.timeout)
            .json(&SearchRequest { q: query, num })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(query = %query, "Web search timed out");
                }
                SearchError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Serper error");
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_knowledge_graph_and_organic() {
        let raw = r#"{
            "searchParameters": {"q": "Acme company official website"},
            "knowledgeGraph": {"title": "Acme Corp", "website": "https://www.acme.com/"},
            "organic": [{"title": "Acme", "link": "https://acme.com/about", "snippet": "Widgets", "position": 1}]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.knowledge_graph.unwrap().website.as_deref(),
            Some("https://www.acme.com/")
        );
        assert_eq!(parsed.organic[0].link, "https://acme.com/about");
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic.is_empty());
        assert!(parsed.knowledge_graph.is_none());
    }

    /// Accepts connections and never answers them
    async fn silent_server() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_stalled_search_times_out() {
        let addr = silent_server().await;
        let client = SerperClient::new(Client::new(), Some("key".to_string()))
            .with_endpoint(format!("http://{}/search", addr))
            .with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = client.search("Acme company", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::RequestFailed(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_search_without_key_is_not_configured() {
        let client = SerperClient::new(Client::new(), None);
        let err = client.search("Acme company", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured));
    }
}
