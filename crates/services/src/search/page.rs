use super::ports::{PageFetchError, PageFetcherTrait};
use crate::common::truncate_chars;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Elements whose contents are never visible text
static HIDDEN_ELEMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript", "head", "template"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("valid element regex")
        })
        .collect()
});
static FOOTNOTE_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\[\d+\]:\s.*$").expect("valid footnote regex"));
static FOOTNOTE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\]").expect("valid footnote reference regex"));

const RENDER_WIDTH: usize = 200;

/// Fetches source pages and reduces them to a bounded run of visible text
pub struct HttpPageFetcher {
    client: reqwest::Client,
    max_chars: usize,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, max_chars: usize) -> Result<Self, PageFetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chat-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PageFetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client, max_chars })
    }
}

/// Visible text of an HTML document with whitespace collapsed.
///
/// Link footnotes produced by the text renderer are dropped so that the only
/// bracketed numbers the model sees are citation markers.
pub fn extract_visible_text(html: &str) -> String {
    let mut stripped = html.to_string();
    for element in HIDDEN_ELEMENTS.iter() {
        stripped = element.replace_all(&stripped, " ").into_owned();
    }

    let rendered = html2text::from_read(stripped.as_bytes(), RENDER_WIDTH)
        .unwrap_or_else(|_| stripped.clone());
    let rendered = FOOTNOTE_DEFINITION.replace_all(&rendered, "");
    let rendered = FOOTNOTE_REFERENCE.replace_all(&rendered, "");

    collapse_whitespace(&rendered)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait::async_trait]
impl PageFetcherTrait for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, PageFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PageFetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFetchError::RequestFailed(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();

        let body = response
            .text()
            .await
            .map_err(|e| PageFetchError::RequestFailed(e.to_string()))?;

        let text = if content_type.contains("html") || content_type.contains("xml") {
            extract_visible_text(&body)
        } else if content_type.starts_with("text/") {
            collapse_whitespace(&body)
        } else {
            return Err(PageFetchError::UnsupportedContent(content_type));
        };

        Ok(truncate_chars(&text, self.max_chars))
    }
}
