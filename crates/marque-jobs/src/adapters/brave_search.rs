//! BraveSearch — web search backend against the Brave Search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use marque_core::defaults::{BRAVE_SEARCH_URL, SEARCH_TIMEOUT_SECS};
use marque_core::{Error, Result, SearchHit, WebSearchBackend};

/// Environment variable naming the Brave Search subscription token.
pub const BRAVE_API_KEY_ENV: &str = "BRAVE_API_KEY";

/// Web search backend using the Brave Search REST API.
///
/// Every failure mode (transport, non-2xx, malformed body) maps to
/// [`Error::Search`] so callers can treat the whole provider as a soft
/// dependency.
pub struct BraveSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl BraveSearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: BRAVE_SEARCH_URL.to_string(),
        })
    }

    /// Build from `BRAVE_API_KEY`; `Ok(None)` when the credential is absent,
    /// which soft-disables the search task.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(BRAVE_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::new(key).map(Some),
            _ => Ok(None),
        }
    }

    /// Override the search endpoint (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWebSection>,
}

#[derive(Deserialize)]
struct BraveWebSection {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Deserialize)]
struct BraveResult {
    url: String,
    title: String,
    #[serde(default)]
    description: String,
}

#[async_trait]
impl WebSearchBackend for BraveSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        debug!(
            subsystem = "jobs",
            component = "brave_search",
            query,
            "Running web search"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| Error::Search(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Search(format!(
                "search provider returned {}",
                response.status()
            )));
        }

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("malformed search response: {e}")))?;

        Ok(body
            .web
            .map(|section| {
                section
                    .results
                    .into_iter()
                    .map(|r| SearchHit {
                        url: r.url,
                        title: r.title,
                        description: r.description,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
