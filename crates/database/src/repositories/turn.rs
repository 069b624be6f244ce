use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use services::conversations::{ConversationId, NewTurn, Turn, TurnId, TurnRepository};
use uuid::Uuid;

const TURN_COLUMNS: &str = "id, conversation_id, role, content, thinking, created_at";

pub struct PgTurnRepository {
    pool: DbPool,
}

impl PgTurnRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_turn(&self, row: tokio_postgres::Row) -> Result<Turn> {
        let id: Uuid = row.try_get("id")?;
        let conversation_id: Uuid = row.try_get("conversation_id")?;
        let role: String = row.try_get("role")?;

        Ok(Turn {
            id: id.into(),
            conversation_id: conversation_id.into(),
            role: role
                .parse()
                .map_err(|e| anyhow::anyhow!("Stored turn {id} has bad role: {e}"))?,
            content: row.try_get("content")?,
            thinking: row.try_get("thinking")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl TurnRepository for PgTurnRepository {
    async fn create(&self, turn: NewTurn) -> Result<Turn> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one(
                &format!(
                    r#"
            INSERT INTO turns (id, conversation_id, role, content, thinking, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TURN_COLUMNS}
            "#
                ),
                &[
                    &Uuid::new_v4(),
                    &turn.conversation_id.0,
                    &turn.role.as_str(),
                    &turn.content,
                    &turn.thinking,
                    &Utc::now(),
                ],
            )
            .await
            .context("Failed to create turn")?;

        self.row_to_turn(row)
    }

    async fn get_by_id(&self, id: TurnId) -> Result<Option<Turn>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt(
                &format!("SELECT {TURN_COLUMNS} FROM turns WHERE id = $1"),
                &[&id.0],
            )
            .await
            .context("Failed to query turn")?;

        row.map(|row| self.row_to_turn(row)).transpose()
    }

    async fn list_by_conversation(&self, conversation_id: ConversationId) -> Result<Vec<Turn>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let rows = client
            .query(
                &format!(
                    "SELECT {TURN_COLUMNS} FROM turns WHERE conversation_id = $1 ORDER BY created_at ASC, seq ASC"
                ),
                &[&conversation_id.0],
            )
            .await
            .context("Failed to list turns")?;

        rows.into_iter().map(|row| self.row_to_turn(row)).collect()
    }
}
