use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
pub const MAX_RESULTS_PER_QUERY: u32 = 5;
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "snippet")]
    pub content: Option<String>,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// External web search used by web research and profile discovery.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Clone)]
pub struct TavilySearch {
    client: Client,
    api_key: String,
}

impl TavilySearch {
    pub fn new(api_key: String) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(SEARCH_TIMEOUT).build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .bearer_auth(&self.api_key)
            .json(&TavilyRequest {
                query,
                max_results: MAX_RESULTS_PER_QUERY,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: TavilyResponse = response.json().await?;
        debug!(query, results = parsed.results.len(), "Search completed");
        Ok(parsed.results)
    }
}

/// Stand-in used when no search API key is configured: every query finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSearch;

#[async_trait]
impl WebSearch for DisabledSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        debug!(query, "Web search disabled, returning no results");
        Ok(Vec::new())
    }
}
