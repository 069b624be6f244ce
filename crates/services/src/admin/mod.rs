pub mod ports;

use crate::credits::CreditServiceTrait;
use async_trait::async_trait;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub use ports::*;

pub struct AdminServiceImpl {
    repository: Arc<dyn AdminRepository>,
    credits: Arc<dyn CreditServiceTrait>,
    admin_token: Option<String>,
}

impl AdminServiceImpl {
    pub fn new(
        repository: Arc<dyn AdminRepository>,
        credits: Arc<dyn CreditServiceTrait>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            repository,
            credits,
            admin_token: admin_token.filter(|t| !t.is_empty()),
        }
    }
}

/// Constant-time comparison so response timing does not leak a prefix match
fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[async_trait]
impl AdminServiceTrait for AdminServiceImpl {
    fn authorize(&self, presented: Option<&str>) -> Result<(), AdminError> {
        match (&self.admin_token, presented) {
            (Some(expected), Some(presented)) if tokens_match(expected, presented) => Ok(()),
            (None, _) => {
                tracing::warn!("Admin request rejected: no admin token configured");
                Err(AdminError::Unauthorized)
            }
            _ => Err(AdminError::Unauthorized),
        }
    }

    async fn get_stats(&self) -> Result<AdminStats, AdminError> {
        let counts = self
            .repository
            .store_counts()
            .await
            .map_err(|e| AdminError::InternalError(format!("Failed to count records: {e}")))?;
        let credits = self
            .credits
            .current_ledger()
            .await
            .map_err(|e| AdminError::InternalError(e.to_string()))?;

        Ok(AdminStats { counts, credits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credits::{CreditLedger, MockCreditServiceTrait};

    fn service(token: Option<&str>) -> AdminServiceImpl {
        let mut repo = MockAdminRepository::new();
        repo.expect_store_counts().returning(|| {
            Ok(StoreCounts {
                chats: 2,
                messages: 4,
                likes: 1,
                dislikes: 0,
                events: 7,
            })
        });
        let mut credits = MockCreditServiceTrait::new();
        credits.expect_current_ledger().returning(|| {
            Ok(Some(CreditLedger {
                remaining: 199,
                date: chrono::NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            }))
        });
        AdminServiceImpl::new(Arc::new(repo), Arc::new(credits), token.map(String::from))
    }

    #[test]
    fn test_authorize() {
        let admin = service(Some("s3cret"));
        assert!(admin.authorize(Some("s3cret")).is_ok());
        assert!(admin.authorize(Some("s3cre")).is_err());
        assert!(admin.authorize(Some("s3cret!")).is_err());
        assert!(admin.authorize(None).is_err());
    }

    #[test]
    fn test_authorize_without_configured_token() {
        let admin = service(None);
        assert!(admin.authorize(None).is_err());
        assert!(admin.authorize(Some("")).is_err());

        let admin = service(Some(""));
        assert!(admin.authorize(Some("")).is_err());
    }

    #[tokio::test]
    async fn test_get_stats_serializes_flat() {
        let stats = service(Some("t")).get_stats().await.unwrap();
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["chats"], 2);
        assert_eq!(json["messages"], 4);
        assert_eq!(json["likes"], 1);
        assert_eq!(json["dislikes"], 0);
        assert_eq!(json["events"], 7);
        assert_eq!(json["credits"]["remaining"], 199);
        assert_eq!(json["credits"]["date"], "2026-01-02");
    }
}
