use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use services::analytics::{AnalyticsEvent, AnalyticsRepository};
use uuid::Uuid;

pub struct PgAnalyticsRepository {
    pool: DbPool,
}

impl PgAnalyticsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    async fn record(
        &self,
        name: &str,
        properties: Option<serde_json::Value>,
    ) -> Result<AnalyticsEvent> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let event = AnalyticsEvent {
            id: Uuid::new_v4(),
            name: name.to_string(),
            properties,
            created_at: Utc::now(),
        };

        client
            .execute(
                r#"
            INSERT INTO analytics_events (id, name, properties, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
                &[&event.id, &event.name, &event.properties, &event.created_at],
            )
            .await
            .context("Failed to record analytics event")?;

        Ok(event)
    }
}
