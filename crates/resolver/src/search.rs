//! Web search provider used for identifier disambiguation.

use async_trait::async_trait;
use prospectus_common::{ProspectusError, Result};
use serde::Deserialize;
use tracing::debug;

/// One external search: query text in, result text out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

const SERPER_API_URL: &str = "https://google.serper.dev/search";

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Deserialize)]
struct SerperResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Serper-backed web search.
pub struct SerperSearch {
    api_key: String,
    n_results: usize,
    http_client: reqwest::Client,
}

impl SerperSearch {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            n_results: 3,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_n_results(mut self, n_results: usize) -> Self {
        self.n_results = n_results;
        self
    }
}

#[async_trait]
impl SearchProvider for SerperSearch {
    async fn search(&self, query: &str) -> Result<String> {
        debug!(query = %query, "Issuing web search");

        let response = self
            .http_client
            .post(SERPER_API_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&serde_json::json!({ "q": query, "num": self.n_results }))
            .send()
            .await
            .map_err(|e| ProspectusError::Backend(format!("Search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProspectusError::Backend(format!(
                "Search API error {status}: {body_text}"
            )));
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| ProspectusError::Backend(format!("Failed to parse search response: {e}")))?;

        Ok(parsed
            .organic
            .iter()
            .take(self.n_results)
            .map(|r| format!("{} — {}", r.title, r.snippet))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
