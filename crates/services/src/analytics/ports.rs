use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// Product analytics event; append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub name: String,
    pub properties: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record(
        &self,
        name: &str,
        properties: Option<serde_json::Value>,
    ) -> Result<AnalyticsEvent>;
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait AnalyticsServiceTrait: Send + Sync {
    async fn record_event(
        &self,
        name: &str,
        properties: Option<serde_json::Value>,
    ) -> std::result::Result<AnalyticsEvent, AnalyticsError>;
}
