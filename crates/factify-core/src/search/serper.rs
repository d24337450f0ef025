//! Serper (Google Search API) client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

use super::{EvidenceSnippet, Searcher};

const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

/// Serper search client
#[derive(Clone)]
pub struct SerperClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Serper response; only organic results are used
#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

impl From<OrganicResult> for EvidenceSnippet {
    fn from(r: OrganicResult) -> Self {
        EvidenceSnippet {
            title: r.title.unwrap_or_default(),
            snippet: r.snippet.unwrap_or_default(),
            link: r.link.unwrap_or_default(),
        }
    }
}

impl SerperClient {
    /// Create a new Serper client
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .search
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("SERPER_API_KEY not set".to_string()))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(Error::Http)?;

        let base_url = config
            .search
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Searcher for SerperClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<EvidenceSnippet>> {
        let url = format!("{}/search", self.base_url);

        debug!(query = %query, limit = limit, "Sending search request to Serper");

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({
                "q": query,
                "num": limit,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Search("Serper request timed out".to_string())
                } else {
                    Error::Search(format!("Serper request failed: {}", e))
                }
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(Error::Search("Serper quota exceeded".to_string()));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Search("Serper rejected the API key".to_string()));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!("Serper API error: {} - {}", status, body);
                return Err(Error::Search(format!("Serper API error ({}): {}", status, body)));
            }
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse Serper response: {}", e)))?;

        Ok(parsed
            .organic
            .into_iter()
            .take(limit)
            .map(EvidenceSnippet::from)
            .collect())
    }
}
