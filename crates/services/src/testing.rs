//! In-memory implementations of every repository port, for tests in this
//! crate and (behind the `test-mocks` feature) in the API crate.

use crate::admin::{AdminRepository, StoreCounts};
use crate::analytics::{AnalyticsEvent, AnalyticsRepository};
use crate::conversations::{
    Conversation, ConversationId, ConversationRepository, NewTurn, Turn, TurnId, TurnRepository,
};
use crate::credits::{CreditLedger, CreditRepository};
use crate::feedback::{Feedback, FeedbackRepository, FeedbackType};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct State {
    conversations: Vec<Conversation>,
    turns: Vec<Turn>,
    feedback: Vec<Feedback>,
    events: Vec<AnalyticsEvent>,
    ledger: Option<CreditLedger>,
}

/// Shared store that behaves like the Postgres repositories
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_ledger(&self, ledger: CreditLedger) {
        self.state.lock().await.ledger = Some(ledger);
    }

    pub async fn conversation(&self, id: ConversationId) -> Option<Conversation> {
        let state = self.state.lock().await;
        state.conversations.iter().find(|c| c.id == id).cloned()
    }

    pub async fn turns_for(&self, id: ConversationId) -> Vec<Turn> {
        let state = self.state.lock().await;
        state
            .turns
            .iter()
            .filter(|t| t.conversation_id == id)
            .cloned()
            .collect()
    }

    pub async fn conversation_count(&self) -> usize {
        self.state.lock().await.conversations.len()
    }

    pub async fn turn_count(&self) -> usize {
        self.state.lock().await.turns.len()
    }

    pub async fn event_count(&self) -> usize {
        self.state.lock().await.events.len()
    }

    /// (likes, dislikes)
    pub async fn feedback_counts(&self) -> (i64, i64) {
        let state = self.state.lock().await;
        count_feedback(&state.feedback)
    }
}

fn count_feedback(feedback: &[Feedback]) -> (i64, i64) {
    feedback
        .iter()
        .fold((0, 0), |(likes, dislikes), f| match f.feedback_type {
            FeedbackType::Like => (likes + 1, dislikes),
            FeedbackType::Dislike => (likes, dislikes + 1),
        })
}

#[async_trait]
impl ConversationRepository for InMemoryStore {
    async fn create(&self, title: &str) -> Result<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: ConversationId(Uuid::new_v4()),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn get_by_id(&self, id: ConversationId) -> Result<Option<Conversation>> {
        Ok(self.conversation(id).await)
    }

    async fn touch(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let mut state = self.state.lock().await;
        Ok(state
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn list(&self) -> Result<Vec<Conversation>> {
        let mut conversations = self.state.lock().await.conversations.clone();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn delete(&self, id: ConversationId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.conversations.len();
        state.conversations.retain(|c| c.id != id);
        if state.conversations.len() == before {
            return Ok(false);
        }

        let removed: Vec<TurnId> = state
            .turns
            .iter()
            .filter(|t| t.conversation_id == id)
            .map(|t| t.id)
            .collect();
        state.turns.retain(|t| t.conversation_id != id);
        state.feedback.retain(|f| !removed.contains(&f.turn_id));
        Ok(true)
    }
}

#[async_trait]
impl TurnRepository for InMemoryStore {
    async fn create(&self, turn: NewTurn) -> Result<Turn> {
        let mut state = self.state.lock().await;
        if !state
            .conversations
            .iter()
            .any(|c| c.id == turn.conversation_id)
        {
            anyhow::bail!("conversation {} does not exist", turn.conversation_id);
        }

        let stored = Turn {
            id: TurnId(Uuid::new_v4()),
            conversation_id: turn.conversation_id,
            role: turn.role,
            content: turn.content,
            thinking: turn.thinking,
            created_at: Utc::now(),
        };
        state.turns.push(stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: TurnId) -> Result<Option<Turn>> {
        let state = self.state.lock().await;
        Ok(state.turns.iter().find(|t| t.id == id).cloned())
    }

    async fn list_by_conversation(&self, conversation_id: ConversationId) -> Result<Vec<Turn>> {
        Ok(self.turns_for(conversation_id).await)
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn create(
        &self,
        turn_id: TurnId,
        feedback_type: FeedbackType,
        comment: Option<String>,
    ) -> Result<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            turn_id,
            feedback_type,
            comment,
            created_at: Utc::now(),
        };
        self.state.lock().await.feedback.push(feedback.clone());
        Ok(feedback)
    }
}

#[async_trait]
impl CreditRepository for InMemoryStore {
    async fn ensure(&self, today: NaiveDate, daily_limit: i32) -> Result<CreditLedger> {
        let mut state = self.state.lock().await;
        let ledger = match state.ledger.take() {
            Some(ledger) if ledger.date >= today => ledger,
            _ => CreditLedger {
                remaining: daily_limit,
                date: today,
            },
        };
        state.ledger = Some(ledger.clone());
        Ok(ledger)
    }

    async fn decrement(&self, amount: i32) -> Result<()> {
        if let Some(ledger) = self.state.lock().await.ledger.as_mut() {
            ledger.remaining = (ledger.remaining - amount).max(0);
        }
        Ok(())
    }

    async fn get(&self) -> Result<Option<CreditLedger>> {
        Ok(self.state.lock().await.ledger.clone())
    }
}

#[async_trait]
impl AnalyticsRepository for InMemoryStore {
    async fn record(
        &self,
        name: &str,
        properties: Option<serde_json::Value>,
    ) -> Result<AnalyticsEvent> {
        let event = AnalyticsEvent {
            id: Uuid::new_v4(),
            name: name.to_string(),
            properties,
            created_at: Utc::now(),
        };
        self.state.lock().await.events.push(event.clone());
        Ok(event)
    }
}

#[async_trait]
impl AdminRepository for InMemoryStore {
    async fn store_counts(&self) -> Result<StoreCounts> {
        let state = self.state.lock().await;
        let (likes, dislikes) = count_feedback(&state.feedback);
        Ok(StoreCounts {
            chats: state.conversations.len() as i64,
            messages: state.turns.len() as i64,
            likes,
            dislikes,
            events: state.events.len() as i64,
        })
    }
}
