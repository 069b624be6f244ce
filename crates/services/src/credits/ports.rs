use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// The single persistent search-credit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreditLedger {
    pub remaining: i32,
    /// Calendar day (UTC) the balance belongs to
    pub date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum CreditError {
    #[error("Credit store error: {0}")]
    StoreError(String),
}

/// Storage for the credit ledger.
///
/// Implementations must make each call a single atomic update so that
/// concurrent requests never lose a decrement.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait CreditRepository: Send + Sync {
    /// Create the ledger with `daily_limit` if it does not exist, and reset it
    /// to `daily_limit` when its date is before `today`. Returns the result.
    async fn ensure(&self, today: NaiveDate, daily_limit: i32) -> Result<CreditLedger>;

    /// Subtract `amount`, clamping at zero. No-op when the ledger is missing.
    async fn decrement(&self, amount: i32) -> Result<()>;

    /// Current ledger without creating or resetting it
    async fn get(&self) -> Result<Option<CreditLedger>>;
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait CreditServiceTrait: Send + Sync {
    /// Remaining credits for today, creating or resetting the ledger as needed
    async fn ensure_credits(&self) -> Result<i32, CreditError>;

    async fn decrement_credits(&self, amount: i32) -> Result<(), CreditError>;

    async fn current_ledger(&self) -> Result<Option<CreditLedger>, CreditError>;
}
