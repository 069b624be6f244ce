use crate::conversations::{errors::ConversationError, models::*};
use anyhow::Result;
use async_trait::async_trait;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Create a new conversation
    async fn create(&self, title: &str) -> Result<Conversation>;

    /// Get a conversation by ID
    async fn get_by_id(&self, id: ConversationId) -> Result<Option<Conversation>>;

    /// Bump `updated_at` to now, leaving the title unchanged
    async fn touch(&self, id: ConversationId) -> Result<Option<Conversation>>;

    /// All conversations, most recently updated first
    async fn list(&self) -> Result<Vec<Conversation>>;

    /// Delete a conversation (will cascade delete its turns)
    async fn delete(&self, id: ConversationId) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait TurnRepository: Send + Sync {
    async fn create(&self, turn: NewTurn) -> Result<Turn>;

    async fn get_by_id(&self, id: TurnId) -> Result<Option<Turn>>;

    /// Turns of a conversation, oldest first
    async fn list_by_conversation(&self, conversation_id: ConversationId) -> Result<Vec<Turn>>;
}

#[async_trait]
pub trait ConversationServiceTrait: Send + Sync {
    async fn create_conversation(
        &self,
        title: Option<String>,
    ) -> Result<Conversation, ConversationError>;

    async fn get_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ConversationError>;

    async fn list_conversations(&self) -> Result<Vec<Conversation>, ConversationError>;

    async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<bool, ConversationError>;

    /// Load the conversation named by `conversation_id` and mark it as
    /// updated, or create a new one titled after `first_message` when the id
    /// is absent, malformed or unknown. The flag is true for a new conversation.
    async fn resolve_for_message(
        &self,
        conversation_id: Option<&str>,
        first_message: &str,
    ) -> Result<(Conversation, bool), ConversationError>;

    async fn list_turns(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Turn>, ConversationError>;

    async fn append_turn(&self, turn: NewTurn) -> Result<Turn, ConversationError>;
}
