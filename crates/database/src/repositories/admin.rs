use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use services::admin::{AdminRepository, StoreCounts};

pub struct PgAdminRepository {
    pool: DbPool,
}

impl PgAdminRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for PgAdminRepository {
    async fn store_counts(&self) -> Result<StoreCounts> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one(
                r#"
            SELECT
                (SELECT COUNT(*) FROM conversations) AS chats,
                (SELECT COUNT(*) FROM turns) AS messages,
                (SELECT COUNT(*) FROM feedback WHERE feedback_type = 'like') AS likes,
                (SELECT COUNT(*) FROM feedback WHERE feedback_type = 'dislike') AS dislikes,
                (SELECT COUNT(*) FROM analytics_events) AS events
            "#,
                &[],
            )
            .await
            .context("Failed to count stored rows")?;

        Ok(StoreCounts {
            chats: row.try_get("chats")?,
            messages: row.try_get("messages")?,
            likes: row.try_get("likes")?,
            dislikes: row.try_get("dislikes")?,
            events: row.try_get("events")?,
        })
    }
}
