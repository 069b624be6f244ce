use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use services::conversations::{Conversation, ConversationId, ConversationRepository};
use tracing::debug;
use uuid::Uuid;

pub struct PgConversationRepository {
    pool: DbPool,
}

impl PgConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_conversation(&self, row: tokio_postgres::Row) -> Result<Conversation> {
        let id: Uuid = row.try_get("id")?;

        Ok(Conversation {
            id: id.into(),
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    async fn create(&self, title: &str) -> Result<Conversation> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = client
            .query_one(
                r#"
            INSERT INTO conversations (id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, created_at, updated_at
            "#,
                &[&id, &title, &now, &now],
            )
            .await
            .context("Failed to create conversation")?;

        debug!("Created conversation: {}", id);
        self.row_to_conversation(row)
    }

    async fn get_by_id(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt(
                "SELECT id, title, created_at, updated_at FROM conversations WHERE id = $1",
                &[&id.0],
            )
            .await
            .context("Failed to query conversation")?;

        row.map(|row| self.row_to_conversation(row)).transpose()
    }

    async fn touch(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt(
                r#"
            UPDATE conversations
            SET updated_at = $2
            WHERE id = $1
            RETURNING id, title, created_at, updated_at
            "#,
                &[&id.0, &Utc::now()],
            )
            .await
            .context("Failed to update conversation")?;

        row.map(|row| self.row_to_conversation(row)).transpose()
    }

    async fn list(&self) -> Result<Vec<Conversation>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let rows = client
            .query(
                "SELECT id, title, created_at, updated_at FROM conversations ORDER BY updated_at DESC",
                &[],
            )
            .await
            .context("Failed to list conversations")?;

        rows.into_iter()
            .map(|row| self.row_to_conversation(row))
            .collect()
    }

    /// Delete a conversation (will cascade delete its turns and their feedback)
    async fn delete(&self, id: ConversationId) -> Result<bool> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let result = client
            .execute("DELETE FROM conversations WHERE id = $1", &[&id.0])
            .await
            .context("Failed to delete conversation")?;

        if result > 0 {
            debug!("Deleted conversation: {}", id);
        }
        Ok(result > 0)
    }
}
