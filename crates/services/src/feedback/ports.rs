use crate::conversations::TurnId;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Like,
    Dislike,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Like => "like",
            FeedbackType::Dislike => "dislike",
        }
    }
}

impl std::str::FromStr for FeedbackType {
    type Err = FeedbackError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "like" => Ok(FeedbackType::Like),
            "dislike" => Ok(FeedbackType::Dislike),
            other => Err(FeedbackError::InvalidParams(format!(
                "Invalid feedback type: {other}"
            ))),
        }
    }
}

/// Append-only reaction to an assistant turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub turn_id: TurnId,
    pub feedback_type: FeedbackType,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create(
        &self,
        turn_id: TurnId,
        feedback_type: FeedbackType,
        comment: Option<String>,
    ) -> Result<Feedback>;
}

#[async_trait]
pub trait FeedbackServiceTrait: Send + Sync {
    async fn submit_feedback(
        &self,
        turn_id: &str,
        feedback_type: FeedbackType,
        comment: Option<String>,
    ) -> std::result::Result<Feedback, FeedbackError>;
}
