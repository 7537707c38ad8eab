//! In-memory publisher for tests and local runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{ChangeEvent, EventPublisher, OperationKind, PublishError};

/// Records every event it is asked to publish.
///
/// Events go through the same JSON payload the Kafka publisher sends, and
/// what is recorded is the decoded message a consumer would see.
/// `publish_count` counts attempts, failed ones included, so tests can
/// assert that no publish was attempted at all.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    delivered: Arc<Mutex<Vec<ChangeEvent>>>,
    attempts: Arc<AtomicUsize>,
    fail_on_publish: Arc<AtomicBool>,
}

impl InMemoryPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent publish calls fail with `DeliveryFailed`.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.fail_on_publish.store(fail, Ordering::SeqCst);
    }

    /// Number of publish calls made, successful or not.
    pub fn publish_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Events that were delivered, in order.
    pub async fn events(&self) -> Vec<ChangeEvent> {
        self.delivered.lock().await.clone()
    }

    /// Operation kinds of delivered events, in order.
    pub async fn operations(&self) -> Vec<OperationKind> {
        self.delivered
            .lock()
            .await
            .iter()
            .map(|e| e.operation)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, event: &ChangeEvent) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail_on_publish.load(Ordering::SeqCst) {
            return Err(PublishError::DeliveryFailed {
                entity_id: event.entity_id,
                reason: "broker did not acknowledge".to_string(),
            });
        }

        let received = ChangeEvent::from_payload(&event.to_payload()?)?;
        self.delivered.lock().await.push(received);
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use common::CompanyId;

    use super::*;

    #[tokio::test]
    async fn test_records_delivered_events() {
        let publisher = InMemoryPublisher::new();
        let id = CompanyId::new();

        publisher.publish(&ChangeEvent::deleted(id)).await.unwrap();

        assert_eq!(publisher.publish_count(), 1);
        let events = publisher.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_id, id);
        assert_eq!(publisher.operations().await, vec![OperationKind::Deleted]);
    }

    #[tokio::test]
    async fn test_fail_on_publish() {
        let publisher = InMemoryPublisher::new();
        publisher.set_fail_on_publish(true);

        let result = publisher.publish(&ChangeEvent::deleted(CompanyId::new())).await;

        assert!(matches!(result, Err(PublishError::DeliveryFailed { .. })));
        assert_eq!(publisher.publish_count(), 1);
        assert!(publisher.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_records_what_a_consumer_decodes() {
        let publisher = InMemoryPublisher::new();
        let event = ChangeEvent::deleted(CompanyId::new());

        publisher.publish(&event).await.unwrap();

        assert_eq!(publisher.events().await, vec![event]);
    }
}
