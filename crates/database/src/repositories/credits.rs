use crate::pool::DbPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use services::credits::{CreditLedger, CreditRepository};

/// The ledger is the single row with `id = 1`; every operation is one
/// statement so concurrent requests cannot lose updates.
pub struct PgCreditRepository {
    pool: DbPool,
}

impl PgCreditRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_ledger(row: &tokio_postgres::Row) -> Result<CreditLedger> {
        Ok(CreditLedger {
            remaining: row.try_get("remaining")?,
            date: row.try_get("date")?,
        })
    }
}

#[async_trait]
impl CreditRepository for PgCreditRepository {
    async fn ensure(&self, today: NaiveDate, daily_limit: i32) -> Result<CreditLedger> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_one(
                r#"
            INSERT INTO search_credits (id, remaining, date)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE SET
                remaining = CASE WHEN search_credits.date < EXCLUDED.date
                                 THEN EXCLUDED.remaining ELSE search_credits.remaining END,
                date = GREATEST(search_credits.date, EXCLUDED.date)
            RETURNING remaining, date
            "#,
                &[&daily_limit, &today],
            )
            .await
            .context("Failed to ensure search credits")?;

        Self::row_to_ledger(&row)
    }

    async fn decrement(&self, amount: i32) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        client
            .execute(
                "UPDATE search_credits SET remaining = GREATEST(0, remaining - $1) WHERE id = 1",
                &[&amount],
            )
            .await
            .context("Failed to decrement search credits")?;

        Ok(())
    }

    async fn get(&self) -> Result<Option<CreditLedger>> {
        let client = self
            .pool
            .get()
            .await
            .context("Failed to get database connection")?;

        let row = client
            .query_opt("SELECT remaining, date FROM search_credits WHERE id = 1", &[])
            .await
            .context("Failed to query search credits")?;

        row.as_ref().map(Self::row_to_ledger).transpose()
    }
}
