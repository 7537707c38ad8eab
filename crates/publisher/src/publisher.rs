use std::sync::Arc;

use async_trait::async_trait;

use crate::{ChangeEvent, PublishError};

/// Delivers change events to the messaging transport.
///
/// `publish` resolves only once the broker has acknowledged the message or
/// the implementation's delivery timeout has elapsed. Whether a failure is
/// fatal is up to the caller.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event, keyed by its company identifier.
    async fn publish(&self, event: &ChangeEvent) -> Result<(), PublishError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn publish(&self, event: &ChangeEvent) -> Result<(), PublishError> {
        (**self).publish(event).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
