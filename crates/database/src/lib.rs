pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, DbPool};
pub use repositories::{
    PgAdminRepository, PgAnalyticsRepository, PgConversationRepository, PgCreditRepository,
    PgFeedbackRepository, PgTurnRepository,
};

use anyhow::Result;
use std::sync::Arc;

/// Database service combining all repositories
pub struct Database {
    pub conversations: Arc<PgConversationRepository>,
    pub turns: Arc<PgTurnRepository>,
    pub feedback: Arc<PgFeedbackRepository>,
    pub credits: Arc<PgCreditRepository>,
    pub analytics: Arc<PgAnalyticsRepository>,
    pub admin: Arc<PgAdminRepository>,
    pool: DbPool,
}

impl Database {
    /// Create a new database service from a connection pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            conversations: Arc::new(PgConversationRepository::new(pool.clone())),
            turns: Arc::new(PgTurnRepository::new(pool.clone())),
            feedback: Arc::new(PgFeedbackRepository::new(pool.clone())),
            credits: Arc::new(PgCreditRepository::new(pool.clone())),
            analytics: Arc::new(PgAnalyticsRepository::new(pool.clone())),
            admin: Arc::new(PgAdminRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create a new database service from configuration
    pub async fn from_config(config: &config::DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config).await?;
        Ok(Self::new(pool))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run(&self.pool).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}
