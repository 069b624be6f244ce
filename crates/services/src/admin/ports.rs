use crate::credits::CreditLedger;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// Row counts across the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub chats: i64,
    pub messages: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub events: i64,
}

/// Admin dashboard snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    #[serde(flatten)]
    pub counts: StoreCounts,
    /// Stored credit ledger, `None` before the first search
    pub credits: Option<CreditLedger>,
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn store_counts(&self) -> Result<StoreCounts>;
}

#[async_trait]
pub trait AdminServiceTrait: Send + Sync {
    /// Check the presented admin token. Always fails when no token is configured.
    fn authorize(&self, presented: Option<&str>) -> std::result::Result<(), AdminError>;

    async fn get_stats(&self) -> std::result::Result<AdminStats, AdminError>;
}
