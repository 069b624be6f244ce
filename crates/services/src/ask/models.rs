use crate::search::WebDocument;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

#[derive(Debug, Clone)]
pub struct AskRequest {
    /// Conversation to continue; a new one is created when absent or unknown
    pub conversation_id: Option<String>,
    pub message: String,
}

/// One event of an ask stream, serialized with its kind in a `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AskEvent {
    /// Sent once, before any model output
    Meta {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        citations: Vec<WebDocument>,
    },
    Token {
        text: String,
    },
    Thinking {
        text: String,
    },
    /// The named model takes over after the previous one failed mid-answer;
    /// clients should discard the partial answer shown so far
    Restart {
        model: String,
    },
    Done {},
    Error {
        message: String,
    },
}

impl AskEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AskEvent::Done {} | AskEvent::Error { .. })
    }
}

pub type AskEventStream = Pin<Box<dyn Stream<Item = AskEvent> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}
