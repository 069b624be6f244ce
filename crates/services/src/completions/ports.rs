use async_trait::async_trait;
use inference_providers::ChatMessage;

/// Receives incremental output while a completion streams.
///
/// Output is forwarded as it arrives and is never retracted. When a model
/// fails after producing output and another candidate takes over,
/// `on_restart` marks the boundary before the new model's first output.
pub trait StreamHandler: Send {
    fn on_token(&mut self, text: &str);

    fn on_thinking(&mut self, text: &str);

    fn on_restart(&mut self, _model: &str) {}
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionServiceError {
    /// Every candidate failed. Carries the last candidate's sanitized error.
    #[error("{}", .last_error.as_deref().unwrap_or("All models failed"))]
    AllModelsFailed { last_error: Option<String> },
}

#[async_trait]
pub trait CompletionServiceTrait: Send + Sync {
    /// Stream a chat completion, trying each candidate model in order until
    /// one finishes without error. Returns the model that succeeded.
    ///
    /// `model_preferences` overrides the configured candidate list when it
    /// is non-empty.
    async fn stream_chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model_preferences: Option<Vec<String>>,
        handler: &mut dyn StreamHandler,
    ) -> Result<String, CompletionServiceError>;
}
