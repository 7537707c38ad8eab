//! Publisher error types.

use common::CompanyId;
use thiserror::Error;

/// Errors that can occur while announcing a change.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The broker did not acknowledge the message within the delivery timeout.
    #[error("Delivery failed for company {entity_id}: {reason}")]
    DeliveryFailed { entity_id: CompanyId, reason: String },

    /// The event could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The publisher is misconfigured.
    #[error("Publisher configuration error: {0}")]
    Config(String),
}
