use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

use crate::credits::CreditError;

/// A retrieved web document. Once it survives context assembly its snippet
/// holds the text actually given to the model, and its position in
/// [`RetrievedContext::docs`] is its citation number minus one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WebDocument {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Citation-indexed context block plus the documents it was built from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetrievedContext {
    pub context: String,
    pub docs: Vec<WebDocument>,
}

impl RetrievedContext {
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebSearchError {
    #[error("Web search request failed: {0}")]
    WebSearchRequestFailed(String),
    #[error("Web search response parsing failed: {0}")]
    WebSearchResponseParsingFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PageFetchError {
    #[error("Page request failed: {0}")]
    RequestFailed(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Credits(#[from] CreditError),
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait WebSearchProviderTrait: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<WebDocument>, WebSearchError>;
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait PageFetcherTrait: Send + Sync {
    /// Visible text of the page at `url`, already trimmed to the configured length
    async fn fetch_text(&self, url: &str) -> Result<String, PageFetchError>;
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait RetrievalServiceTrait: Send + Sync {
    /// Search the web for `query` and assemble a citation-indexed context.
    ///
    /// Returns an empty context (not an error) when search is not configured,
    /// the daily quota is spent, or the search provider is unavailable.
    async fn build_context(&self, query: &str) -> Result<RetrievedContext, RetrievalError>;
}
