pub mod ports;

use async_trait::async_trait;
use std::sync::Arc;

pub use ports::*;

/// Event name recorded for every ask request
pub const ASK_EVENT: &str = "ask";

const MAX_EVENT_NAME_CHARS: usize = 100;

pub struct AnalyticsServiceImpl {
    repository: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsServiceImpl {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AnalyticsServiceTrait for AnalyticsServiceImpl {
    async fn record_event(
        &self,
        name: &str,
        properties: Option<serde_json::Value>,
    ) -> Result<AnalyticsEvent, AnalyticsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AnalyticsError::InvalidParams(
                "Event name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_EVENT_NAME_CHARS {
            return Err(AnalyticsError::InvalidParams(format!(
                "Event name must be at most {MAX_EVENT_NAME_CHARS} characters"
            )));
        }
        if properties.as_ref().is_some_and(|p| !p.is_object()) {
            return Err(AnalyticsError::InvalidParams(
                "Event properties must be a JSON object".to_string(),
            ));
        }

        self.repository
            .record(name, properties)
            .await
            .map_err(|e| AnalyticsError::InternalError(format!("Failed to record event: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_event_trims_name() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_record()
            .withf(|name: &str, props: &Option<serde_json::Value>| {
                name == "page_view" && props.is_some()
            })
            .times(1)
            .returning(|name, properties| {
                Ok(AnalyticsEvent {
                    id: uuid::Uuid::new_v4(),
                    name: name.to_string(),
                    properties,
                    created_at: chrono::Utc::now(),
                })
            });

        let service = AnalyticsServiceImpl::new(Arc::new(repo));
        let event = service
            .record_event(" page_view ", Some(json!({"path": "/"})))
            .await
            .unwrap();
        assert_eq!(event.name, "page_view");
    }

    #[tokio::test]
    async fn test_record_event_validation() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_record().never();
        let service = AnalyticsServiceImpl::new(Arc::new(repo));

        assert!(matches!(
            service.record_event("  ", None).await,
            Err(AnalyticsError::InvalidParams(_))
        ));
        assert!(matches!(
            service.record_event(&"x".repeat(101), None).await,
            Err(AnalyticsError::InvalidParams(_))
        ));
        assert!(matches!(
            service.record_event("click", Some(json!([1, 2]))).await,
            Err(AnalyticsError::InvalidParams(_))
        ));
    }
}
