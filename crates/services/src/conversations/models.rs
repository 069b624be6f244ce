use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversations::errors;

pub const DEFAULT_CONVERSATION_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct ConversationId(pub Uuid);

impl std::str::FromStr for ConversationId {
    type Err = errors::ConversationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(ConversationId).map_err(|_| {
            errors::ConversationError::InvalidParams(format!("Invalid conversation ID: {value}"))
        })
    }
}

impl From<Uuid> for ConversationId {
    fn from(uuid: Uuid) -> Self {
        ConversationId(uuid)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct TurnId(pub Uuid);

impl std::str::FromStr for TurnId {
    type Err = errors::ConversationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(TurnId).map_err(|_| {
            errors::ConversationError::InvalidParams(format!("Invalid message ID: {value}"))
        })
    }
}

impl From<Uuid> for TurnId {
    fn from(uuid: Uuid) -> Self {
        TurnId(uuid)
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversation model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for TurnRole {
    type Err = errors::ConversationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(errors::ConversationError::InvalidParams(format!(
                "Invalid role: {other}"
            ))),
        }
    }
}

/// One persisted message of a conversation. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub conversation_id: ConversationId,
    pub role: TurnRole,
    pub content: String,
    /// Reasoning trace, assistant turns only
    pub thinking: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A turn that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTurn {
    pub conversation_id: ConversationId,
    pub role: TurnRole,
    pub content: String,
    pub thinking: Option<String>,
}

impl NewTurn {
    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            role: TurnRole::User,
            content: content.into(),
            thinking: None,
        }
    }

    pub fn assistant(
        conversation_id: ConversationId,
        content: impl Into<String>,
        thinking: Option<String>,
    ) -> Self {
        Self {
            conversation_id,
            role: TurnRole::Assistant,
            content: content.into(),
            thinking,
        }
    }
}
