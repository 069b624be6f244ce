use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use services::conversations::TurnId;
use services::feedback::{Feedback, FeedbackRepository, FeedbackType};
use uuid::Uuid;

pub struct PgFeedbackRepository {
    pool: DbPool,
}

impl PgFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PgFeedbackRepository {
    async fn create(
        &self,
        turn_id: TurnId,
        feedback_type: FeedbackType,
        comment: Option<String>,
    ) -> Result<Feedback> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let feedback = Feedback {
            id: Uuid::new_v4(),
            turn_id,
            feedback_type,
            comment,
            created_at: Utc::now(),
        };

        client
            .execute(
                r#"
            INSERT INTO feedback (id, turn_id, feedback_type, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
                &[
                    &feedback.id,
                    &feedback.turn_id.0,
                    &feedback.feedback_type.as_str(),
                    &feedback.comment,
                    &feedback.created_at,
                ],
            )
            .await
            .context("Failed to store feedback")?;

        Ok(feedback)
    }
}
