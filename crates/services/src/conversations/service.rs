use crate::common::truncate_chars;
use crate::conversations::{errors::ConversationError, models::*, ports};
use async_trait::async_trait;
use std::sync::Arc;

/// Conversation service for managing conversations and their turns
pub struct ConversationServiceImpl {
    pub conv_repo: Arc<dyn ports::ConversationRepository>,
    pub turn_repo: Arc<dyn ports::TurnRepository>,
    title_max_chars: usize,
}

impl ConversationServiceImpl {
    pub fn new(
        conv_repo: Arc<dyn ports::ConversationRepository>,
        turn_repo: Arc<dyn ports::TurnRepository>,
        title_max_chars: usize,
    ) -> Self {
        Self {
            conv_repo,
            turn_repo,
            title_max_chars,
        }
    }

    fn title_from_message(&self, message: &str) -> String {
        let title = truncate_chars(message, self.title_max_chars);
        if title.trim().is_empty() {
            DEFAULT_CONVERSATION_TITLE.to_string()
        } else {
            title
        }
    }

    async fn create_titled(&self, title: &str) -> Result<Conversation, ConversationError> {
        let conversation = self.conv_repo.create(title).await.map_err(|e| {
            ConversationError::InternalError(format!("Failed to create conversation: {e}"))
        })?;

        tracing::info!(conversation_id = %conversation.id, "Created conversation");
        Ok(conversation)
    }
}

#[async_trait]
impl ports::ConversationServiceTrait for ConversationServiceImpl {
    async fn create_conversation(
        &self,
        title: Option<String>,
    ) -> Result<Conversation, ConversationError> {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_string());

        self.create_titled(&title).await
    }

    async fn get_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ConversationError> {
        self.conv_repo
            .get_by_id(conversation_id)
            .await
            .map_err(|e| ConversationError::InternalError(format!("Failed to get conversation: {e}")))
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, ConversationError> {
        let conversations = self.conv_repo.list().await.map_err(|e| {
            ConversationError::InternalError(format!("Failed to list conversations: {e}"))
        })?;

        tracing::debug!("Found {} conversations", conversations.len());
        Ok(conversations)
    }

    async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<bool, ConversationError> {
        let deleted = self.conv_repo.delete(conversation_id).await.map_err(|e| {
            ConversationError::InternalError(format!("Failed to delete conversation: {e}"))
        })?;

        if deleted {
            tracing::info!(conversation_id = %conversation_id, "Deleted conversation");
        }
        Ok(deleted)
    }

    async fn resolve_for_message(
        &self,
        conversation_id: Option<&str>,
        first_message: &str,
    ) -> Result<(Conversation, bool), ConversationError> {
        let requested = conversation_id
            .filter(|id| !id.trim().is_empty())
            .and_then(|id| match id.parse::<ConversationId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::debug!(conversation_id = %id, "Malformed conversation ID, starting a new conversation");
                    None
                }
            });

        if let Some(id) = requested {
            let existing = self.conv_repo.touch(id).await.map_err(|e| {
                ConversationError::InternalError(format!("Failed to load conversation: {e}"))
            })?;
            if let Some(conversation) = existing {
                return Ok((conversation, false));
            }
            tracing::debug!(conversation_id = %id, "Conversation not found, starting a new conversation");
        }

        let title = self.title_from_message(first_message);
        let conversation = self.create_titled(&title).await?;
        Ok((conversation, true))
    }

    async fn list_turns(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Turn>, ConversationError> {
        self.turn_repo
            .list_by_conversation(conversation_id)
            .await
            .map_err(|e| ConversationError::InternalError(format!("Failed to load messages: {e}")))
    }

    async fn append_turn(&self, turn: NewTurn) -> Result<Turn, ConversationError> {
        let role = turn.role;
        let stored = self.turn_repo.create(turn).await.map_err(|e| {
            ConversationError::InternalError(format!("Failed to save {} message: {e}", role.as_str()))
        })?;

        tracing::debug!(
            conversation_id = %stored.conversation_id,
            turn_id = %stored.id,
            role = role.as_str(),
            "Stored turn"
        );
        Ok(stored)
    }
}
