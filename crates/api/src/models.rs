use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use services::{
    admin::AdminStats,
    conversations::{Conversation, Turn, TurnRole},
    credits::CreditLedger,
    feedback::{Feedback, FeedbackType},
    search::WebDocument,
};
use utoipa::ToSchema;

// ============================================
// Errors
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: String, error_type: String) -> Self {
        Self {
            error: ErrorDetail {
                message,
                r#type: error_type,
                param: None,
            },
        }
    }

    pub fn with_param(message: String, error_type: String, param: String) -> Self {
        Self {
            error: ErrorDetail {
                message,
                r#type: error_type,
                param: Some(param),
            },
        }
    }
}

// ============================================
// Ask
// ============================================

/// Body of `POST /v1/ask`.
///
/// `message` is kept as raw JSON so a missing or non-string value is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    /// Conversation to continue; omitted or unknown starts a new one
    #[serde(default)]
    pub chat_id: Option<String>,
    #[schema(value_type = String)]
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl AskRequest {
    pub fn validate(&self) -> Result<(String, Option<String>), String> {
        let message = match &self.message {
            Some(serde_json::Value::String(message)) if !message.trim().is_empty() => message,
            Some(serde_json::Value::String(_)) => {
                return Err("message must not be empty".to_string())
            }
            Some(_) => return Err("message must be a string".to_string()),
            None => return Err("message is required".to_string()),
        };

        let chat_id = self.chat_id.clone().filter(|id| !id.trim().is_empty());
        Ok((message.clone(), chat_id))
    }
}

/// Documents the JSON carried in each `data:` frame of the ask stream
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskStreamEventSchema {
    /// `meta`, `token`, `thinking`, `restart`, `done` or `error`
    pub r#type: String,
    /// meta only
    pub conversation_id: Option<String>,
    /// meta only
    pub citations: Option<Vec<CitationObject>>,
    /// token and thinking
    pub text: Option<String>,
    /// restart only
    pub model: Option<String>,
    /// error only
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CitationObject {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl From<WebDocument> for CitationObject {
    fn from(doc: WebDocument) -> Self {
        Self {
            title: doc.title,
            url: doc.url,
            snippet: doc.snippet,
        }
    }
}

// ============================================
// Chats
// ============================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateChatRequest {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct DeleteChatQuery {
    /// Conversation ID
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatObject {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ChatObject {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            title: conversation.title,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatDeleteResult {
    pub id: String,
    pub deleted: bool,
}

// ============================================
// Messages and feedback
// ============================================

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    /// Conversation ID
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageObject {
    pub id: String,
    pub chat_id: String,
    pub role: TurnRole,
    pub content: String,
    pub thinking: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Turn> for MessageObject {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id.to_string(),
            chat_id: turn.conversation_id.to_string(),
            role: turn.role,
            content: turn.content,
            thinking: turn.thinking,
            created_at: turn.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub message_id: String,
    pub r#type: FeedbackType,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackObject {
    pub id: String,
    pub message_id: String,
    pub r#type: FeedbackType,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackObject {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id.to_string(),
            message_id: feedback.turn_id.to_string(),
            r#type: feedback.feedback_type,
            comment: feedback.comment,
            created_at: feedback.created_at,
        }
    }
}

// ============================================
// Analytics events
// ============================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: String,
    /// Arbitrary JSON object
    #[schema(value_type = Option<Object>)]
    pub properties: Option<serde_json::Value>,
}

// ============================================
// Admin
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreditLedgerObject {
    pub remaining: i32,
    pub date: NaiveDate,
}

impl From<CreditLedger> for CreditLedgerObject {
    fn from(ledger: CreditLedger) -> Self {
        Self {
            remaining: ledger.remaining,
            date: ledger.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminStatsResponse {
    pub chats: i64,
    pub messages: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub events: i64,
    /// `null` until the first search creates the ledger
    pub credits: Option<CreditLedgerObject>,
}

impl From<AdminStats> for AdminStatsResponse {
    fn from(stats: AdminStats) -> Self {
        Self {
            chats: stats.counts.chats,
            messages: stats.counts.messages,
            likes: stats.counts.likes,
            dislikes: stats.counts.dislikes,
            events: stats.counts.events,
            credits: stats.credits.map(Into::into),
        }
    }
}
