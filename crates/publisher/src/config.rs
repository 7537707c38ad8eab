//! Publisher configuration.

use std::time::Duration;

use crate::PublishError;

/// Kafka producer configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Kafka bootstrap servers (comma-separated).
    pub bootstrap_servers: String,

    /// Topic company change events are published to.
    pub topic: String,

    /// How long to wait for the broker to acknowledge a message.
    pub delivery_timeout: Duration,

    /// Client identifier reported to the broker.
    pub client_id: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            topic: "producer.company".to_string(),
            delivery_timeout: Duration::from_secs(5),
            client_id: "company-service".to_string(),
        }
    }
}

impl PublisherConfig {
    /// Create config from environment variables.
    ///
    /// - `KAFKA_BROKERS`: broker list (default: "localhost:9092")
    /// - `KAFKA_TOPIC`: topic (default: "producer.company")
    /// - `KAFKA_DELIVERY_TIMEOUT_SECS`: acknowledgment timeout (default: 5)
    /// - `KAFKA_CLIENT_ID`: client id (default: "company-service")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bootstrap_servers: std::env::var("KAFKA_BROKERS")
                .unwrap_or(defaults.bootstrap_servers),
            topic: std::env::var("KAFKA_TOPIC").unwrap_or(defaults.topic),
            delivery_timeout: std::env::var("KAFKA_DELIVERY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.delivery_timeout),
            client_id: std::env::var("KAFKA_CLIENT_ID").unwrap_or(defaults.client_id),
        }
    }

    /// Set the bootstrap servers.
    pub fn with_bootstrap_servers(mut self, servers: impl Into<String>) -> Self {
        self.bootstrap_servers = servers.into();
        self
    }

    /// Set the topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Checks the settings a producer cannot work without.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.bootstrap_servers.trim().is_empty() {
            return Err(PublishError::Config(
                "Kafka bootstrap servers not configured".to_string(),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(PublishError::Config("Kafka topic not configured".to_string()));
        }
        if self.delivery_timeout.is_zero() {
            return Err(PublishError::Config(
                "delivery timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PublisherConfig::default();
        assert_eq!(config.topic, "producer.company");
        assert_eq!(config.delivery_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PublisherConfig::default()
            .with_bootstrap_servers("kafka-1:9092,kafka-2:9092")
            .with_topic("companies")
            .with_delivery_timeout(Duration::from_millis(250));

        assert_eq!(config.bootstrap_servers, "kafka-1:9092,kafka-2:9092");
        assert_eq!(config.topic, "companies");
        assert_eq!(config.delivery_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_bootstrap_servers_fails_validation() {
        let config = PublisherConfig::default().with_bootstrap_servers("");
        assert!(matches!(config.validate(), Err(PublishError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let config = PublisherConfig::default().with_delivery_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
