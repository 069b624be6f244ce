pub mod ports;

use crate::conversations::{ports::TurnRepository, TurnId};
use async_trait::async_trait;
use std::sync::Arc;

pub use ports::*;

const MAX_COMMENT_CHARS: usize = 2000;

pub struct FeedbackServiceImpl {
    feedback_repo: Arc<dyn FeedbackRepository>,
    turn_repo: Arc<dyn TurnRepository>,
}

impl FeedbackServiceImpl {
    pub fn new(
        feedback_repo: Arc<dyn FeedbackRepository>,
        turn_repo: Arc<dyn TurnRepository>,
    ) -> Self {
        Self {
            feedback_repo,
            turn_repo,
        }
    }
}

#[async_trait]
impl FeedbackServiceTrait for FeedbackServiceImpl {
    async fn submit_feedback(
        &self,
        turn_id: &str,
        feedback_type: FeedbackType,
        comment: Option<String>,
    ) -> Result<Feedback, FeedbackError> {
        let turn_id: TurnId = turn_id
            .parse()
            .map_err(|_| FeedbackError::InvalidParams(format!("Invalid message ID: {turn_id}")))?;

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
        {
            return Err(FeedbackError::InvalidParams(format!(
                "Comment must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }

        let turn = self
            .turn_repo
            .get_by_id(turn_id)
            .await
            .map_err(|e| FeedbackError::InternalError(format!("Failed to load message: {e}")))?;
        if turn.is_none() {
            return Err(FeedbackError::NotFound(format!("Message {turn_id}")));
        }

        let feedback = self
            .feedback_repo
            .create(turn_id, feedback_type, comment)
            .await
            .map_err(|e| FeedbackError::InternalError(format!("Failed to save feedback: {e}")))?;

        tracing::info!(
            turn_id = %turn_id,
            feedback_type = feedback_type.as_str(),
            "Feedback recorded"
        );
        Ok(feedback)
    }
}
