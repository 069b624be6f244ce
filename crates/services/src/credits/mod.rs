pub mod ports;

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub use ports::*;

/// Daily search quota backed by a [`CreditRepository`]
pub struct CreditServiceImpl {
    repository: Arc<dyn CreditRepository>,
    daily_limit: i32,
}

impl CreditServiceImpl {
    pub fn new(repository: Arc<dyn CreditRepository>, daily_limit: i32) -> Self {
        Self {
            repository,
            daily_limit: daily_limit.max(0),
        }
    }
}

#[async_trait]
impl CreditServiceTrait for CreditServiceImpl {
    async fn ensure_credits(&self) -> Result<i32, CreditError> {
        let today = Utc::now().date_naive();
        let ledger = self
            .repository
            .ensure(today, self.daily_limit)
            .await
            .map_err(|e| CreditError::StoreError(e.to_string()))?;

        tracing::debug!(remaining = ledger.remaining, date = %ledger.date, "Search credits checked");
        Ok(ledger.remaining)
    }

    async fn decrement_credits(&self, amount: i32) -> Result<(), CreditError> {
        self.repository
            .decrement(amount)
            .await
            .map_err(|e| CreditError::StoreError(e.to_string()))
    }

    async fn current_ledger(&self) -> Result<Option<CreditLedger>, CreditError> {
        self.repository
            .get()
            .await
            .map_err(|e| CreditError::StoreError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;
    use chrono::{Days, NaiveDate};

    fn service(store: &Arc<InMemoryStore>, limit: i32) -> CreditServiceImpl {
        CreditServiceImpl::new(store.clone(), limit)
    }

    #[tokio::test]
    async fn test_first_call_creates_full_ledger() {
        let store = Arc::new(InMemoryStore::new());
        let credits = service(&store, 200);

        assert_eq!(credits.ensure_credits().await.unwrap(), 200);
        let ledger = credits.current_ledger().await.unwrap().unwrap();
        assert_eq!(ledger.date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_decrement_clamps_at_zero() {
        let store = Arc::new(InMemoryStore::new());
        let credits = service(&store, 3);
        credits.ensure_credits().await.unwrap();

        for _ in 0..3 {
            credits.decrement_credits(1).await.unwrap();
        }
        assert_eq!(credits.ensure_credits().await.unwrap(), 0);

        credits.decrement_credits(1).await.unwrap();
        assert_eq!(credits.ensure_credits().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stale_ledger_resets_to_daily_limit() {
        let store = Arc::new(InMemoryStore::new());
        let yesterday = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .unwrap();
        store
            .set_ledger(CreditLedger {
                remaining: 0,
                date: yesterday,
            })
            .await;

        let credits = service(&store, 200);
        assert_eq!(credits.ensure_credits().await.unwrap(), 200);
        let ledger = credits.current_ledger().await.unwrap().unwrap();
        assert_eq!(ledger.date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_decrement_without_ledger_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let credits = service(&store, 10);

        credits.decrement_credits(1).await.unwrap();
        assert!(credits.current_ledger().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut repo = MockCreditRepository::new();
        repo.expect_ensure()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));
        let credits = CreditServiceImpl::new(Arc::new(repo), 5);

        let err = credits.ensure_credits().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_ensure_passes_today_and_limit() {
        let mut repo = MockCreditRepository::new();
        let today = Utc::now().date_naive();
        repo.expect_ensure()
            .withf(move |day: &NaiveDate, limit: &i32| *day == today && *limit == 42)
            .times(1)
            .returning(|day, limit| {
                Ok(CreditLedger {
                    remaining: limit,
                    date: day,
                })
            });
        let credits = CreditServiceImpl::new(Arc::new(repo), 42);

        assert_eq!(credits.ensure_credits().await.unwrap(), 42);
    }
}
