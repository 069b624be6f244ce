//! Mock implementation of InferenceProvider for testing
//!
//! Generates OpenAI-shaped streaming chunks from per-model templates, so
//! fallback behaviour can be exercised without a network gateway.

use crate::{
    ChatChoice, ChatCompletionChunk, ChatCompletionParams, ChatDelta, CompletionError,
    FinishReason, InferenceProvider, MessageRole, StreamingResult,
};
use async_trait::async_trait;
use futures_util::stream;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Template for generating a streamed response
#[derive(Clone, Debug)]
pub struct ResponseTemplate {
    content: String,
    reasoning_content: Option<String>,
    /// Reject the request before any chunk is produced
    fail_on_open: Option<String>,
    /// Emit this many content chunks, then fail mid-stream
    fail_after_chunks: Option<(usize, String)>,
}

impl ResponseTemplate {
    /// Create a new response template with the given content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            reasoning_content: None,
            fail_on_open: None,
            fail_after_chunks: None,
        }
    }

    /// Set reasoning content for this template
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning_content = Some(reasoning.into());
        self
    }

    /// Template whose request fails before streaming starts
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_on_open: Some(message.into()),
            ..Self::new("")
        }
    }

    /// Fail with `message` after `chunks` content chunks have been streamed
    pub fn with_failure_after(mut self, chunks: usize, message: impl Into<String>) -> Self {
        self.fail_after_chunks = Some((chunks, message.into()));
        self
    }

    fn chunk(model: &str, id: &str, delta: ChatDelta, finish: Option<FinishReason>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: id.to_string(),
            object: "chat.completion.chunk".to_string(),
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![ChatChoice {
                index: 0,
                delta: Some(delta),
                finish_reason: finish,
            }],
            usage: None,
        }
    }

    fn generate_stream(&self, model: &str) -> Vec<Result<ChatCompletionChunk, CompletionError>> {
        let id = format!("chatcmpl-{}", uuid::Uuid::new_v4());
        let mut items = Vec::new();

        if let Some(reasoning) = &self.reasoning_content {
            items.push(Ok(Self::chunk(
                model,
                &id,
                ChatDelta {
                    role: Some(MessageRole::Assistant),
                    reasoning_content: Some(reasoning.clone()),
                    ..Default::default()
                },
                None,
            )));
        }

        for (emitted, word) in self.content.split_inclusive(' ').enumerate() {
            if let Some((limit, message)) = &self.fail_after_chunks {
                if emitted == *limit {
                    items.push(Err(CompletionError::CompletionError(message.clone())));
                    return items;
                }
            }
            items.push(Ok(Self::chunk(
                model,
                &id,
                ChatDelta {
                    content: Some(word.to_string()),
                    ..Default::default()
                },
                None,
            )));
        }

        if let Some((_, message)) = &self.fail_after_chunks {
            items.push(Err(CompletionError::CompletionError(message.clone())));
            return items;
        }

        items.push(Ok(Self::chunk(
            model,
            &id,
            ChatDelta::default(),
            Some(FinishReason::Stop),
        )));
        items
    }
}

impl Default for ResponseTemplate {
    fn default() -> Self {
        Self::new("This is a mock response from the assistant.")
    }
}

/// Mock inference provider
pub struct MockProvider {
    templates: HashMap<String, ResponseTemplate>,
    default_template: ResponseTemplate,
    requests: Mutex<Vec<ChatCompletionParams>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            default_template: ResponseTemplate::default(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Use `template` for every model without a dedicated template
    pub fn with_default_response(mut self, template: ResponseTemplate) -> Self {
        self.default_template = template;
        self
    }

    /// Use `template` for requests naming `model`
    pub fn with_model_response(mut self, model: impl Into<String>, template: ResponseTemplate) -> Self {
        self.templates.insert(model.into(), template);
        self
    }

    /// Models requested so far, in call order
    pub async fn requested_models(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|p| p.model.clone())
            .collect()
    }

    /// Full parameters of every request received
    pub async fn requests(&self) -> Vec<ChatCompletionParams> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
    ) -> Result<StreamingResult, CompletionError> {
        let template = self
            .templates
            .get(&params.model)
            .unwrap_or(&self.default_template)
            .clone();
        let model = params.model.clone();
        self.requests.lock().await.push(params);

        if let Some(message) = template.fail_on_open {
            return Err(CompletionError::HttpError {
                status_code: 503,
                message,
            });
        }

        Ok(Box::pin(stream::iter(template.generate_stream(&model))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatMessage;
    use futures_util::StreamExt;

    fn params(model: &str) -> ChatCompletionParams {
        ChatCompletionParams::new(model, vec![ChatMessage::user("hello")])
    }

    #[tokio::test]
    async fn test_default_template_streams_words() {
        let provider = MockProvider::new()
            .with_default_response(ResponseTemplate::new("one two three").with_reasoning("hmm"));

        let stream = provider.chat_completion_stream(params("any")).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;

        let reasoning: String = chunks
            .iter()
            .filter_map(|c| c.as_ref().ok()?.delta()?.reasoning_text().map(String::from))
            .collect();
        let content: String = chunks
            .iter()
            .filter_map(|c| c.as_ref().ok()?.delta()?.content.clone())
            .collect();
        assert_eq!(reasoning, "hmm");
        assert_eq!(content, "one two three");
        assert_eq!(provider.requested_models().await, vec!["any"]);
    }

    #[tokio::test]
    async fn test_failing_template_rejects_request() {
        let provider = MockProvider::new().with_model_response("bad", ResponseTemplate::failing("down"));
        let result = provider.chat_completion_stream(params("bad")).await;
        assert!(matches!(result, Err(CompletionError::HttpError { status_code: 503, .. })));
    }

    #[tokio::test]
    async fn test_failure_after_chunks() {
        let provider = MockProvider::new().with_model_response(
            "flaky",
            ResponseTemplate::new("a b c d").with_failure_after(2, "reset"),
        );
        let stream = provider.chat_completion_stream(params("flaky")).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 3);
        assert!(chunks[2].is_err());
    }
}
