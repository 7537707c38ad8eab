//! Domain error types.

use common::CompanyId;
use company_store::StoreError;
use publisher::{OperationKind, PublishError};
use thiserror::Error;

use crate::command::Committed;

/// Errors surfaced by the company service.
///
/// Every variant except `NotificationFailed` means nothing was changed.
/// `NotificationFailed` means the change *was* stored but the change event
/// could not be delivered; it carries the stored outcome so callers can
/// still report the new state.
#[derive(Debug, Error)]
pub enum CompanyError {
    /// The command is malformed. No store or publisher call was made.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller lacks the write capability. No store or publisher call was made.
    #[error("Write capability required to {operation} a company")]
    Unauthorized { operation: &'static str },

    /// No company with this identifier exists.
    #[error("Company not found: {0}")]
    NotFound(CompanyId),

    /// The store rejected the write because an invariant would break.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store could not be reached in time.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The change is durable but its event was not delivered.
    #[error("Company {} was stored but the {operation} notification failed: {source}", .committed.company_id())]
    NotificationFailed {
        committed: Committed,
        operation: OperationKind,
        source: PublishError,
    },

    /// Anything unexpected.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompanyError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompanyError::InvalidRequest(_) => "invalid_request",
            CompanyError::Unauthorized { .. } => "unauthorized",
            CompanyError::NotFound(_) => "not_found",
            CompanyError::ConstraintViolation(_) => "constraint_violation",
            CompanyError::Unavailable(_) => "unavailable",
            CompanyError::NotificationFailed { .. } => "notification_failed",
            CompanyError::Internal(_) => "internal",
        }
    }

    /// Returns the stored outcome if the change was applied despite the error.
    pub fn committed(&self) -> Option<&Committed> {
        match self {
            CompanyError::NotificationFailed { committed, .. } => Some(committed),
            _ => None,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CompanyError::InvalidRequest(message.into())
    }
}

impl From<StoreError> for CompanyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CompanyError::NotFound(id),
            StoreError::ConstraintViolation { constraint, message } => {
                CompanyError::ConstraintViolation(format!("{message} ({constraint})"))
            }
            StoreError::Unavailable(reason) => CompanyError::Unavailable(reason),
            other @ (StoreError::Database(_) | StoreError::Migration(_)) => {
                CompanyError::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_their_kind() {
        let id = CompanyId::new();
        assert!(matches!(
            CompanyError::from(StoreError::NotFound(id)),
            CompanyError::NotFound(found) if found == id
        ));
        assert_eq!(
            CompanyError::from(StoreError::duplicate_name("Acme")).kind(),
            "constraint_violation"
        );
        assert_eq!(
            CompanyError::from(StoreError::Unavailable("down".into())).kind(),
            "unavailable"
        );
    }

    #[test]
    fn notification_failure_reports_both_facts() {
        let id = CompanyId::new();
        let err = CompanyError::NotificationFailed {
            committed: Committed::Deleted(id),
            operation: OperationKind::Deleted,
            source: PublishError::DeliveryFailed {
                entity_id: id,
                reason: "timeout".to_string(),
            },
        };

        assert_eq!(err.kind(), "notification_failed");
        assert_eq!(err.committed().map(Committed::company_id), Some(id));
        let message = err.to_string();
        assert!(message.contains("was stored"));
        assert!(message.contains("Deleted"));
    }
}
