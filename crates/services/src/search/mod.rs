pub mod page;
pub mod ports;
pub mod tavily;

use crate::credits::CreditServiceTrait;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

pub use page::HttpPageFetcher;
pub use ports::*;
pub use tavily::TavilyWebSearchProvider;

/// Builds the citation-indexed context for a query.
///
/// Search runs only when a provider is configured and the daily quota has
/// credit left; each successful search costs exactly one credit.
pub struct RetrievalServiceImpl {
    search_provider: Option<Arc<dyn WebSearchProviderTrait>>,
    page_fetcher: Arc<dyn PageFetcherTrait>,
    credits: Arc<dyn CreditServiceTrait>,
    max_results: u32,
}

impl RetrievalServiceImpl {
    pub fn new(
        search_provider: Option<Arc<dyn WebSearchProviderTrait>>,
        page_fetcher: Arc<dyn PageFetcherTrait>,
        credits: Arc<dyn CreditServiceTrait>,
        max_results: u32,
    ) -> Self {
        Self {
            search_provider,
            page_fetcher,
            credits,
            max_results,
        }
    }
}

#[async_trait]
impl RetrievalServiceTrait for RetrievalServiceImpl {
    async fn build_context(&self, query: &str) -> Result<RetrievedContext, RetrievalError> {
        let Some(provider) = &self.search_provider else {
            tracing::debug!("Web search not configured, skipping retrieval");
            return Ok(RetrievedContext::default());
        };

        let remaining = self.credits.ensure_credits().await?;
        if remaining <= 0 {
            tracing::info!("Daily search credits exhausted, skipping retrieval");
            return Ok(RetrievedContext::default());
        }

        let results = match provider.search(query, self.max_results).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "Web search failed, continuing without context");
                return Ok(RetrievedContext::default());
            }
        };
        self.credits.decrement_credits(1).await?;

        // Fetch all pages at once; join_all keeps input order
        let pages = join_all(
            results
                .iter()
                .map(|doc| self.page_fetcher.fetch_text(&doc.url)),
        )
        .await;

        let mut context = String::new();
        let mut docs = Vec::with_capacity(results.len());
        for (doc, page) in results.into_iter().zip(pages) {
            let page_text = match page {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(url = %doc.url, error = %e, "Page fetch failed, using search snippet");
                    String::new()
                }
            };
            let snippet = if page_text.trim().is_empty() {
                doc.snippet.trim().to_string()
            } else {
                page_text
            };
            if snippet.is_empty() {
                continue;
            }

            let index = docs.len() + 1;
            context.push_str(&format!("\n[{index}] {} — {}\n{snippet}\n", doc.title, doc.url));
            docs.push(WebDocument { snippet, ..doc });
        }

        tracing::info!(documents = docs.len(), "Retrieval context built");
        Ok(RetrievedContext {
            context: context.trim().to_string(),
            docs,
        })
    }
}
