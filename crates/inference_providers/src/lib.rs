//! Inference providers crate for streaming chat completions
//!
//! This crate provides a streaming-first trait interface over remote
//! completion gateways, so the rest of the service can switch between
//! backends (or a mock in tests) without caring about wire details.
//!
//! # Usage
//!
//! ```rust,ignore
//! use inference_providers::{ChatCompletionParams, ChatMessage, InferenceProvider};
//! use futures_util::StreamExt;
//!
//! async fn example(provider: &dyn InferenceProvider) -> Result<(), CompletionError> {
//!     let params = ChatCompletionParams::new(
//!         "deepseek/deepseek-chat",
//!         vec![ChatMessage::user("Hello")],
//!     );
//!
//!     let mut stream = provider.chat_completion_stream(params).await?;
//!     while let Some(chunk) = stream.next().await {
//!         if let Some(delta) = chunk?.delta() {
//!             print!("{}", delta.content.as_deref().unwrap_or_default());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod mock;
pub mod models;
pub mod openai_compatible;
pub mod sse_parser;

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

// Re-export commonly used types for convenience
pub use mock::MockProvider;
pub use models::{
    ChatChoice, ChatCompletionChunk, ChatCompletionParams, ChatDelta, ChatMessage,
    CompletionError, FinishReason, MessageRole, ReasoningParams, TokenUsage,
};
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use sse_parser::SSEParser;

/// Type alias for streaming completion results
pub type StreamingResult =
    Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, CompletionError>> + Send>>;

#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Performs a streaming chat completion request
    ///
    /// Returns a stream of chunks that can be processed incrementally. An
    /// error from this call means the request was rejected before any output;
    /// an `Err` item inside the stream means it failed part-way.
    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
    ) -> Result<StreamingResult, CompletionError>;
}

/// Pull a human-readable message out of a provider error body.
///
/// Understands `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ..}`; anything else is returned trimmed and truncated.
pub fn extract_error_message(body: &str) -> String {
    const MAX_LEN: usize = 500;

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let message = json
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .or_else(|| json.get("message").and_then(|m| m.as_str()));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_LEN {
        let truncated: String = trimmed.chars().take(MAX_LEN).collect();
        format!("{truncated}...")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message_nested() {
        let body = r#"{"error":{"message":"Rate limit exceeded","code":429}}"#;
        assert_eq!(extract_error_message(body), "Rate limit exceeded");
    }

    #[test]
    fn test_extract_error_message_flat() {
        assert_eq!(extract_error_message(r#"{"error":"bad model"}"#), "bad model");
        assert_eq!(extract_error_message(r#"{"message":"nope"}"#), "nope");
    }

    #[test]
    fn test_extract_error_message_plain_text() {
        assert_eq!(extract_error_message("  upstream timeout \n"), "upstream timeout");
        let long = "x".repeat(600);
        assert_eq!(extract_error_message(&long).len(), 503);
    }
}
