//! The ask pipeline: one user message in, one streamed, cited answer out.
//!
//! The conversation is resolved and its history loaded before the stream is
//! handed back, so failures there surface as ordinary request errors. The
//! rest runs in a spawned task that writes events into an [`EventSink`]:
//!
//! ```text
//! retrieve -> meta -> store user turn -> stream tokens/thinking -> store assistant turn -> done
//! ```
//!
//! Any failure after the stream starts ends it with a single `error` event.

pub mod models;
pub mod prompt;
pub mod sink;

use crate::analytics::{AnalyticsServiceTrait, ASK_EVENT};
use crate::completions::{CompletionServiceTrait, StreamHandler};
use crate::conversations::{Conversation, ConversationServiceTrait, NewTurn, Turn};
use crate::search::RetrievalServiceTrait;
use async_trait::async_trait;
use std::sync::Arc;

pub use models::*;
pub use sink::EventSink;

#[async_trait]
pub trait AskServiceTrait: Send + Sync {
    async fn ask(&self, request: AskRequest) -> Result<AskEventStream, AskError>;
}

#[derive(Clone)]
pub struct AskServiceImpl {
    conversations: Arc<dyn ConversationServiceTrait>,
    retrieval: Arc<dyn RetrievalServiceTrait>,
    completions: Arc<dyn CompletionServiceTrait>,
    analytics: Arc<dyn AnalyticsServiceTrait>,
    system_prompt: Arc<str>,
}

impl AskServiceImpl {
    pub fn new(
        conversations: Arc<dyn ConversationServiceTrait>,
        retrieval: Arc<dyn RetrievalServiceTrait>,
        completions: Arc<dyn CompletionServiceTrait>,
        analytics: Arc<dyn AnalyticsServiceTrait>,
        system_prompt: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            conversations,
            retrieval,
            completions,
            analytics,
            system_prompt: system_prompt.into(),
        }
    }

    /// Drive one answer to completion and close the sink
    async fn run(self, conversation: Conversation, history: Vec<Turn>, message: String, sink: EventSink) {
        match self.answer(&conversation, &history, &message, &sink).await {
            Ok(()) => {
                sink.send(AskEvent::Done {});
            }
            Err(e) => {
                tracing::error!(
                    conversation_id = %conversation.id,
                    error = %e,
                    "Ask pipeline failed"
                );
                sink.send(AskEvent::Error {
                    message: e.to_string(),
                });
            }
        }
        if !sink.is_connected() {
            tracing::debug!(
                conversation_id = %conversation.id,
                "Client disconnected before the answer finished; turns were still saved"
            );
        }
        sink.close();
    }

    async fn answer(
        &self,
        conversation: &Conversation,
        history: &[Turn],
        message: &str,
        sink: &EventSink,
    ) -> Result<(), AskError> {
        let retrieved = self
            .retrieval
            .build_context(message)
            .await
            .map_err(|e| AskError::InternalError(format!("Retrieval failed: {e}")))?;

        sink.send(AskEvent::Meta {
            conversation_id: conversation.id.to_string(),
            citations: retrieved.docs.clone(),
        });

        self.conversations
            .append_turn(NewTurn::user(conversation.id, message))
            .await
            .map_err(|e| AskError::InternalError(e.to_string()))?;

        let messages =
            prompt::compose_messages(&self.system_prompt, history, message, &retrieved.context);

        let mut collector = AnswerCollector::new(sink);
        let model = self
            .completions
            .stream_chat_completion(messages, None, &mut collector)
            .await
            .map_err(|e| AskError::InternalError(e.to_string()))?;
        let (content, thinking) = collector.finish();

        tracing::info!(
            conversation_id = %conversation.id,
            model_id = %model,
            citations = retrieved.docs.len(),
            answer_chars = content.chars().count(),
            "Answer streamed"
        );

        self.conversations
            .append_turn(NewTurn::assistant(conversation.id, content, thinking))
            .await
            .map_err(|e| AskError::InternalError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl AskServiceTrait for AskServiceImpl {
    async fn ask(&self, request: AskRequest) -> Result<AskEventStream, AskError> {
        if request.message.trim().is_empty() {
            return Err(AskError::InvalidParams(
                "message must be a non-empty string".to_string(),
            ));
        }

        let (conversation, created) = self
            .conversations
            .resolve_for_message(request.conversation_id.as_deref(), &request.message)
            .await
            .map_err(|e| AskError::InternalError(e.to_string()))?;
        let history = self
            .conversations
            .list_turns(conversation.id)
            .await
            .map_err(|e| AskError::InternalError(e.to_string()))?;

        tracing::info!(
            conversation_id = %conversation.id,
            new_conversation = created,
            history_turns = history.len(),
            "Ask request accepted"
        );

        let properties = serde_json::json!({
            "conversation_id": conversation.id.to_string(),
            "new_conversation": created,
        });
        if let Err(e) = self.analytics.record_event(ASK_EVENT, Some(properties)).await {
            tracing::warn!(error = %e, "Failed to record ask event");
        }

        let (sink, rx) = EventSink::channel();
        let pipeline = self.clone();
        tokio::spawn(pipeline.run(conversation, history, request.message, sink));

        Ok(Box::pin(rx))
    }
}

/// Forwards model output to the client while keeping the full answer.
///
/// A restart discards what was gathered so far, so the stored answer only
/// ever holds the output of the model that finished.
struct AnswerCollector<'a> {
    sink: &'a EventSink,
    content: String,
    thinking: String,
}

impl<'a> AnswerCollector<'a> {
    fn new(sink: &'a EventSink) -> Self {
        Self {
            sink,
            content: String::new(),
            thinking: String::new(),
        }
    }

    fn finish(self) -> (String, Option<String>) {
        let thinking = (!self.thinking.is_empty()).then_some(self.thinking);
        (self.content, thinking)
    }
}

impl StreamHandler for AnswerCollector<'_> {
    fn on_token(&mut self, text: &str) {
        self.content.push_str(text);
        self.sink.send(AskEvent::Token {
            text: text.to_string(),
        });
    }

    fn on_thinking(&mut self, text: &str) {
        self.thinking.push_str(text);
        self.sink.send(AskEvent::Thinking {
            text: text.to_string(),
        });
    }

    fn on_restart(&mut self, model: &str) {
        self.content.clear();
        self.thinking.clear();
        self.sink.send(AskEvent::Restart {
            model: model.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsServiceImpl;
    use crate::completions::CompletionServiceImpl;
    use crate::conversations::{ConversationServiceImpl, TurnRole};
    use crate::search::{MockRetrievalServiceTrait, RetrievedContext, WebDocument};
    use crate::testing::InMemoryStore;
    use futures::StreamExt;
    use inference_providers::mock::{MockProvider, ResponseTemplate};

    struct Harness {
        store: Arc<InMemoryStore>,
        provider: Arc<MockProvider>,
        ask: AskServiceImpl,
    }

    fn retrieval_with(context: RetrievedContext) -> MockRetrievalServiceTrait {
        let mut retrieval = MockRetrievalServiceTrait::new();
        retrieval
            .expect_build_context()
            .returning(move |_| Ok(context.clone()));
        retrieval
    }

    fn harness(provider: MockProvider, retrieval: MockRetrievalServiceTrait, models: &[&str]) -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(provider);
        let conversations = Arc::new(ConversationServiceImpl::new(store.clone(), store.clone(), 60));
        let completions = Arc::new(CompletionServiceImpl::new(
            provider.clone(),
            models.iter().map(|m| m.to_string()).collect(),
            Some("medium".to_string()),
        ));
        let analytics = Arc::new(AnalyticsServiceImpl::new(store.clone()));
        let ask = AskServiceImpl::new(
            conversations,
            Arc::new(retrieval),
            completions,
            analytics,
            "You are a test assistant.",
        );
        Harness {
            store,
            provider,
            ask,
        }
    }

    fn request(conversation_id: Option<String>, message: &str) -> AskRequest {
        AskRequest {
            conversation_id,
            message: message.to_string(),
        }
    }

    fn context() -> RetrievedContext {
        RetrievedContext {
            context: "[1] Leaf — https://leaf.example\nChlorophyll absorbs light.".to_string(),
            docs: vec![WebDocument {
                title: "Leaf".to_string(),
                url: "https://leaf.example".to_string(),
                snippet: "Chlorophyll absorbs light.".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_new_conversation_end_to_end() {
        let h = harness(
            MockProvider::new().with_default_response(
                ResponseTemplate::new("Plants use light [1].").with_reasoning("Recall biology."),
            ),
            retrieval_with(context()),
            &["model-a"],
        );

        let stream = h
            .ask
            .ask(request(None, "What is photosynthesis?"))
            .await
            .unwrap();
        let events: Vec<AskEvent> = stream.collect().await;

        let AskEvent::Meta {
            conversation_id,
            citations,
        } = &events[0]
        else {
            panic!("first event must be meta, got {:?}", events[0]);
        };
        assert_eq!(citations.len(), 1);
        assert_eq!(events.last(), Some(&AskEvent::Done {}));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

        let tokens: String = events
            .iter()
            .filter_map(|e| match e {
                AskEvent::Token { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tokens, "Plants use light [1].");
        assert!(events.contains(&AskEvent::Thinking {
            text: "Recall biology.".to_string()
        }));

        let id = conversation_id.parse().unwrap();
        let turns = h.store.turns_for(id).await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[0].content, "What is photosynthesis?");
        assert_eq!(turns[1].role, TurnRole::Assistant);
        assert_eq!(turns[1].content, "Plants use light [1].");
        assert_eq!(turns[1].thinking.as_deref(), Some("Recall biology."));

        let conversation = h.store.conversation(id).await.unwrap();
        assert_eq!(conversation.title, "What is photosynthesis?");
        assert_eq!(h.store.event_count().await, 1);
    }

    #[tokio::test]
    async fn test_prompt_includes_history_and_context() {
        let h = harness(MockProvider::new(), retrieval_with(context()), &["model-a"]);

        let first: Vec<AskEvent> = h.ask.ask(request(None, "First?")).await.unwrap().collect().await;
        let AskEvent::Meta { conversation_id, .. } = &first[0] else {
            panic!("expected meta");
        };

        let _: Vec<AskEvent> = h
            .ask
            .ask(request(Some(conversation_id.clone()), "Second?"))
            .await
            .unwrap()
            .collect()
            .await;

        let requests = h.provider.requests().await;
        let second = &requests[1].messages;
        assert_eq!(second.len(), 4);
        assert_eq!(second[0].content, "You are a test assistant.");
        assert_eq!(second[1].content, "First?");
        assert!(second[3].content.starts_with("User Query: Second?"));
        assert!(second[3].content.contains("[1] Leaf — https://leaf.example"));
        assert_eq!(h.store.turns_for(conversation_id.parse().unwrap()).await.len(), 4);
    }

    #[tokio::test]
    async fn test_fallback_persists_only_successful_model_output() {
        let h = harness(
            MockProvider::new()
                .with_model_response(
                    "a",
                    ResponseTemplate::new("broken partial output").with_failure_after(1, "reset"),
                )
                .with_model_response("b", ResponseTemplate::new("clean answer")),
            retrieval_with(RetrievedContext::default()),
            &["a", "b"],
        );

        let events: Vec<AskEvent> = h.ask.ask(request(None, "Q")).await.unwrap().collect().await;

        assert!(events.contains(&AskEvent::Restart {
            model: "b".to_string()
        }));
        assert_eq!(events.last(), Some(&AskEvent::Done {}));

        let AskEvent::Meta { conversation_id, citations } = &events[0] else {
            panic!("expected meta");
        };
        assert!(citations.is_empty());
        let turns = h.store.turns_for(conversation_id.parse().unwrap()).await;
        assert_eq!(turns[1].content, "clean answer");
    }

    #[tokio::test]
    async fn test_all_models_failing_ends_with_single_error() {
        let h = harness(
            MockProvider::new().with_default_response(ResponseTemplate::failing("upstream 503")),
            retrieval_with(RetrievedContext::default()),
            &["a", "b"],
        );

        let events: Vec<AskEvent> = h.ask.ask(request(None, "Q")).await.unwrap().collect().await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AskEvent::Meta { .. }));
        match &events[1] {
            AskEvent::Error { message } => assert!(message.contains("upstream 503")),
            other => panic!("expected error event, got {other:?}"),
        }

        // The user turn stays; no assistant turn is written
        let AskEvent::Meta { conversation_id, .. } = &events[0] else {
            unreachable!()
        };
        let turns = h.store.turns_for(conversation_id.parse().unwrap()).await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, TurnRole::User);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_before_streaming() {
        let mut retrieval = MockRetrievalServiceTrait::new();
        retrieval.expect_build_context().never();
        let h = harness(MockProvider::new(), retrieval, &["a"]);

        let result = h.ask.ask(request(None, "   ")).await;
        assert!(matches!(result, Err(AskError::InvalidParams(_))));
        assert_eq!(h.store.turn_count().await, 0);
        assert_eq!(h.store.conversation_count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnected_client_still_persists_answer() {
        let h = harness(MockProvider::new(), retrieval_with(RetrievedContext::default()), &["a"]);

        let stream = h.ask.ask(request(None, "Q")).await.unwrap();
        drop(stream);

        // The pipeline keeps running in its own task
        for _ in 0..50 {
            if h.store.turn_count().await == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(h.store.turn_count().await, 2);
    }
}
