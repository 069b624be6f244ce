use super::ports::{WebDocument, WebSearchError, WebSearchProviderTrait};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TAVILY_API_URL: &str = "https://api.tavily.com";

/// Web search backed by the Tavily search API
pub struct TavilyWebSearchProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TavilyWebSearchProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WebSearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebSearchError::WebSearchRequestFailed(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    include_answer: bool,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilySearchResult>,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    /// Tavily calls the extract `content`; older responses used `snippet`
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[async_trait::async_trait]
impl WebSearchProviderTrait for TavilyWebSearchProvider {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<WebDocument>, WebSearchError> {
        tracing::debug!(max_results, "Searching the web");

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("X-Tavily-API-Key", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&TavilySearchRequest {
                query,
                include_answer: false,
                max_results,
            })
            .send()
            .await
            .map_err(|e| WebSearchError::WebSearchRequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!("Tavily API error (status {}): {}", status, error_body);
            return Err(WebSearchError::WebSearchRequestFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let body: TavilySearchResponse = response.json().await.map_err(|e| {
            WebSearchError::WebSearchResponseParsingFailed(format!("JSON parsing error: {e}"))
        })?;

        let results: Vec<WebDocument> = body
            .results
            .into_iter()
            .filter_map(|result| {
                let Some(url) = result.url.filter(|u| !u.trim().is_empty()) else {
                    tracing::debug!("Skipping search result without a URL");
                    return None;
                };
                Some(WebDocument {
                    title: result.title.unwrap_or_default(),
                    url,
                    snippet: result.content.or(result.snippet).unwrap_or_default(),
                })
            })
            .collect();
        tracing::debug!("Found {} results", results.len());
        Ok(results)
    }
}
