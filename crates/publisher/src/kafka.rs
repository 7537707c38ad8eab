//! Kafka publisher.
//!
//! Publishes change events to a single topic. Messages are JSON-encoded,
//! keyed by company identifier and tagged with an `operation` header.

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing::{debug, error};

use crate::{ChangeEvent, EventPublisher, PublishError, PublisherConfig};

/// Header carrying the operation kind.
pub const OPERATION_HEADER: &str = "operation";

/// Kafka-backed [`EventPublisher`].
///
/// One producer is created per process and shared by all requests.
pub struct KafkaPublisher {
    producer: FutureProducer,
    config: PublisherConfig,
}

impl KafkaPublisher {
    /// Create a new Kafka publisher with the given configuration.
    pub fn new(config: PublisherConfig) -> Result<Self, PublishError> {
        config.validate()?;

        let producer: FutureProducer = Self::build_client_config(&config)
            .create()
            .map_err(|e| PublishError::Config(format!("Failed to create Kafka producer: {e}")))?;

        tracing::info!(
            bootstrap_servers = %config.bootstrap_servers,
            topic = %config.topic,
            "Kafka company publisher initialized"
        );

        Ok(Self { producer, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, PublishError> {
        Self::new(PublisherConfig::from_env())
    }

    fn build_client_config(config: &PublisherConfig) -> ClientConfig {
        let mut client = ClientConfig::new();
        client.set("bootstrap.servers", &config.bootstrap_servers);
        client.set("client.id", &config.client_id);
        client.set(
            "message.timeout.ms",
            config.delivery_timeout.as_millis().to_string(),
        );
        client.set("acks", "all");
        client.set("enable.idempotence", "true");
        client
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, event: &ChangeEvent) -> Result<(), PublishError> {
        let payload = event.to_payload()?;
        let key = event.key();
        let headers = OwnedHeaders::new().insert(Header {
            key: OPERATION_HEADER,
            value: Some(event.operation.as_str()),
        });

        let record = FutureRecord::to(&self.config.topic)
            .key(&key)
            .payload(&payload)
            .headers(headers);

        match self
            .producer
            .send(record, self.config.delivery_timeout)
            .await
        {
            Ok((partition, offset)) => {
                debug!(
                    topic = %self.config.topic,
                    partition = partition,
                    offset = offset,
                    entity_id = %event.entity_id,
                    operation = %event.operation,
                    "change event delivered"
                );
                metrics::counter!("company_events_published_total", "operation" => event.operation.as_str())
                    .increment(1);
                Ok(())
            }
            Err((e, _)) => {
                error!(
                    topic = %self.config.topic,
                    entity_id = %event.entity_id,
                    operation = %event.operation,
                    error = %e,
                    "change event delivery failed"
                );
                Err(PublishError::DeliveryFailed {
                    entity_id: event.entity_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        "kafka"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_empty_bootstrap_servers_fails() {
        let config = PublisherConfig::default().with_bootstrap_servers("");
        let result = KafkaPublisher::new(config);
        assert!(matches!(result, Err(PublishError::Config(_))));
    }

    #[test]
    fn test_client_config_carries_timeout_and_acks() {
        let config = PublisherConfig::default().with_delivery_timeout(Duration::from_millis(1500));
        let client = KafkaPublisher::build_client_config(&config);

        assert_eq!(client.get("message.timeout.ms"), Some("1500"));
        assert_eq!(client.get("acks"), Some("all"));
        assert_eq!(client.get("bootstrap.servers"), Some("localhost:9092"));
    }
}
