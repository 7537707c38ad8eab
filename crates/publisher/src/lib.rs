//! Change-event publishing.
//!
//! Every successful company mutation is announced as a [`ChangeEvent`] on a
//! key-partitioned topic. The key is the company identifier, so a
//! transport that orders by key keeps events for one company in order.
//!
//! The Kafka implementation is behind the `kafka` feature because it links
//! against librdkafka.

pub mod config;
pub mod error;
pub mod event;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod memory;
pub mod publisher;

pub use config::PublisherConfig;
pub use error::PublishError;
pub use event::{ChangeEvent, OperationKind};
#[cfg(feature = "kafka")]
pub use kafka::KafkaPublisher;
pub use memory::InMemoryPublisher;
pub use publisher::EventPublisher;
