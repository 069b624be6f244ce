//! OpenAI-compatible provider implementation
//!
//! Handles any gateway that speaks OpenAI's chat completions format,
//! including OpenRouter (the default), OpenAI itself, Together, Groq and
//! self-hosted vLLM servers.

use crate::{
    extract_error_message, sse_parser::SSEParser, ChatCompletionParams, CompletionError,
    InferenceProvider, StreamingResult,
};
use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client};
use std::collections::HashMap;
use std::time::Duration;

/// Connection settings for an OpenAI-compatible gateway
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g. "https://openrouter.ai/api/v1")
    pub base_url: String,
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Extra headers sent with every request (e.g. OpenRouter's `X-Title`)
    pub extra_headers: HashMap<String, String>,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: None,
            timeout_seconds: 120,
            extra_headers: HashMap::new(),
        }
    }
}

pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                CompletionError::CompletionError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn build_headers(&self) -> Result<reqwest::header::HeaderMap, String> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Accept", HeaderValue::from_static("text/event-stream"));

        if let Some(api_key) = &self.config.api_key {
            let header_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| format!("Invalid API key format: {e}"))?;
            headers.insert("Authorization", header_value);
        }

        for (name, value) in &self.config.extra_headers {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| format!("Invalid header name {name}: {e}"))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| format!("Invalid header value for {name}: {e}"))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl InferenceProvider for OpenAiCompatibleProvider {
    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
    ) -> Result<StreamingResult, CompletionError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut streaming_params = params;
        streaming_params.stream = Some(true);

        let headers = self
            .build_headers()
            .map_err(CompletionError::CompletionError)?;

        tracing::debug!(model = %streaming_params.model, "Opening streaming chat completion");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .json(&streaming_params)
            .send()
            .await
            .map_err(|e| CompletionError::CompletionError(e.to_string()))?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response body: {e}"));
            return Err(CompletionError::HttpError {
                status_code,
                message: extract_error_message(&error_text),
            });
        }

        let sse_stream = SSEParser::new(Box::pin(response.bytes_stream()));
        Ok(Box::pin(sse_stream))
    }
}
