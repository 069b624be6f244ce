pub mod ports;

use crate::common::sanitize_error_message;
use async_trait::async_trait;
use futures::StreamExt;
use inference_providers::{
    ChatCompletionParams, ChatMessage, CompletionError, InferenceProvider, ReasoningParams,
};
use std::sync::Arc;

pub use ports::*;

/// Failure of a single candidate model
struct AttemptFailure {
    error: CompletionError,
    /// Whether the stream opened, so a pending restart was delivered
    opened: bool,
    /// Whether any token or reasoning text reached the handler first
    emitted: bool,
}

/// Streams completions from an ordered list of candidate models
pub struct CompletionServiceImpl {
    provider: Arc<dyn InferenceProvider>,
    default_models: Vec<String>,
    reasoning_effort: Option<String>,
}

impl CompletionServiceImpl {
    pub fn new(
        provider: Arc<dyn InferenceProvider>,
        default_models: Vec<String>,
        reasoning_effort: Option<String>,
    ) -> Self {
        Self {
            provider,
            default_models,
            reasoning_effort,
        }
    }

    async fn stream_with_model(
        &self,
        model: &str,
        messages: &[ChatMessage],
        restart: bool,
        handler: &mut dyn StreamHandler,
    ) -> Result<(), AttemptFailure> {
        let mut params = ChatCompletionParams::new(model, messages.to_vec());
        params.stream = Some(true);
        params.reasoning = self
            .reasoning_effort
            .as_ref()
            .map(|effort| ReasoningParams {
                effort: effort.clone(),
            });

        let mut stream = self
            .provider
            .chat_completion_stream(params)
            .await
            .map_err(|error| AttemptFailure {
                error,
                opened: false,
                emitted: false,
            })?;

        if restart {
            handler.on_restart(model);
        }

        let mut emitted = false;
        while let Some(item) = stream.next().await {
            let chunk = item.map_err(|error| AttemptFailure {
                error,
                opened: true,
                emitted,
            })?;
            let Some(delta) = chunk.delta() else {
                continue;
            };

            if let Some(text) = delta.content.as_deref().filter(|t| !t.is_empty()) {
                handler.on_token(text);
                emitted = true;
            }
            if let Some(text) = delta.reasoning_text().filter(|t| !t.is_empty()) {
                handler.on_thinking(text);
                emitted = true;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CompletionServiceTrait for CompletionServiceImpl {
    async fn stream_chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model_preferences: Option<Vec<String>>,
        handler: &mut dyn StreamHandler,
    ) -> Result<String, CompletionServiceError> {
        let candidates = match model_preferences {
            Some(models) if !models.is_empty() => models,
            _ => self.default_models.clone(),
        };

        tracing::debug!(
            candidates = ?candidates,
            messages = messages.len(),
            "Starting streamed completion"
        );

        let mut last_error: Option<String> = None;
        let mut needs_restart = false;

        for (attempt, model) in candidates.iter().enumerate() {
            match self
                .stream_with_model(model, &messages, needs_restart, handler)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        model_id = %model,
                        attempt = attempt + 1,
                        "Completion finished"
                    );
                    return Ok(model.clone());
                }
                Err(failure) => {
                    let sanitized = sanitize_error_message(&failure.error.to_string());
                    tracing::warn!(
                        model_id = %model,
                        attempt = attempt + 1,
                        total_candidates = candidates.len(),
                        emitted = failure.emitted,
                        error = %sanitized,
                        "Model failed, will try next candidate if available"
                    );
                    // A restart stays pending until some candidate actually opens
                    if failure.opened {
                        needs_restart = failure.emitted;
                    }
                    last_error = Some(sanitized);
                }
            }
        }

        tracing::error!(
            candidates = ?candidates,
            last_error = ?last_error,
            "All candidate models failed"
        );
        Err(CompletionServiceError::AllModelsFailed { last_error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_providers::mock::{MockProvider, ResponseTemplate};

    #[derive(Default)]
    struct RecordingHandler {
        tokens: Vec<String>,
        thinking: Vec<String>,
        restarts: Vec<String>,
    }

    impl StreamHandler for RecordingHandler {
        fn on_token(&mut self, text: &str) {
            self.tokens.push(text.to_string());
        }

        fn on_thinking(&mut self, text: &str) {
            self.thinking.push(text.to_string());
        }

        fn on_restart(&mut self, model: &str) {
            self.restarts.push(model.to_string());
        }
    }

    fn service(provider: Arc<MockProvider>, models: &[&str]) -> CompletionServiceImpl {
        CompletionServiceImpl::new(
            provider,
            models.iter().map(|m| m.to_string()).collect(),
            Some("medium".to_string()),
        )
    }

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are helpful."),
            ChatMessage::user("Hi"),
        ]
    }

    #[tokio::test]
    async fn test_first_model_success_stops_iteration() {
        let provider = Arc::new(
            MockProvider::new()
                .with_model_response("a", ResponseTemplate::new("hello there").with_reasoning("think")),
        );
        let completions = service(provider.clone(), &["a", "b"]);
        let mut handler = RecordingHandler::default();

        let model = completions
            .stream_chat_completion(messages(), None, &mut handler)
            .await
            .unwrap();

        assert_eq!(model, "a");
        assert_eq!(handler.tokens.concat(), "hello there");
        assert_eq!(handler.thinking, vec!["think"]);
        assert!(handler.restarts.is_empty());
        assert_eq!(provider.requested_models().await, vec!["a"]);

        let requests = provider.requests().await;
        assert_eq!(requests[0].stream, Some(true));
        assert_eq!(
            requests[0].reasoning.as_ref().map(|r| r.effort.as_str()),
            Some("medium")
        );
        assert_eq!(requests[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_after_open_failure_uses_second_model_only() {
        let provider = Arc::new(
            MockProvider::new()
                .with_model_response("a", ResponseTemplate::failing("model overloaded"))
                .with_model_response("b", ResponseTemplate::new("from b")),
        );
        let completions = service(provider.clone(), &["a", "b"]);
        let mut handler = RecordingHandler::default();

        let model = completions
            .stream_chat_completion(messages(), None, &mut handler)
            .await
            .unwrap();

        assert_eq!(model, "b");
        assert_eq!(handler.tokens.concat(), "from b");
        assert!(handler.restarts.is_empty());
        assert_eq!(provider.requested_models().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_signals_restart() {
        let provider = Arc::new(
            MockProvider::new()
                .with_model_response(
                    "a",
                    ResponseTemplate::new("partial answer that breaks")
                        .with_failure_after(2, "connection reset"),
                )
                .with_model_response("b", ResponseTemplate::new("complete answer")),
        );
        let completions = service(provider.clone(), &["a", "b"]);
        let mut handler = RecordingHandler::default();

        completions
            .stream_chat_completion(messages(), None, &mut handler)
            .await
            .unwrap();

        assert_eq!(handler.restarts, vec!["b"]);
        assert_eq!(handler.tokens.concat(), "partial answer complete answer");
    }

    #[tokio::test]
    async fn test_restart_names_the_model_that_takes_over() {
        let provider = Arc::new(
            MockProvider::new()
                .with_model_response(
                    "a",
                    ResponseTemplate::new("partial answer that breaks")
                        .with_failure_after(2, "connection reset"),
                )
                .with_model_response("b", ResponseTemplate::failing("model overloaded"))
                .with_model_response("c", ResponseTemplate::new("complete answer")),
        );
        let completions = service(provider.clone(), &["a", "b", "c"]);
        let mut handler = RecordingHandler::default();

        let model = completions
            .stream_chat_completion(messages(), None, &mut handler)
            .await
            .unwrap();

        assert_eq!(model, "c");
        assert_eq!(handler.restarts, vec!["c"]);
        assert_eq!(handler.tokens.concat(), "partial answer complete answer");
        assert_eq!(provider.requested_models().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_all_models_fail_reports_last_error() {
        let provider = Arc::new(
            MockProvider::new()
                .with_model_response("a", ResponseTemplate::failing("first broke"))
                .with_model_response("b", ResponseTemplate::failing("second broke at http://10.1.2.3:9000")),
        );
        let completions = service(provider, &["a", "b"]);
        let mut handler = RecordingHandler::default();

        let err = completions
            .stream_chat_completion(messages(), None, &mut handler)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("second broke"));
        assert!(!message.contains("first broke"));
        assert!(!message.contains("10.1.2.3"));
        assert!(handler.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_empty_candidate_list_fails_generically() {
        let completions = service(Arc::new(MockProvider::new()), &[]);
        let mut handler = RecordingHandler::default();

        let err = completions
            .stream_chat_completion(messages(), None, &mut handler)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "All models failed");
    }

    #[tokio::test]
    async fn test_model_preferences_override_defaults() {
        let provider = Arc::new(MockProvider::new());
        let completions = service(provider.clone(), &["a", "b"]);
        let mut handler = RecordingHandler::default();

        let model = completions
            .stream_chat_completion(messages(), Some(vec!["custom".to_string()]), &mut handler)
            .await
            .unwrap();
        assert_eq!(model, "custom");

        completions
            .stream_chat_completion(messages(), Some(vec![]), &mut handler)
            .await
            .unwrap();
        assert_eq!(provider.requested_models().await, vec!["custom", "a"]);
    }
}
