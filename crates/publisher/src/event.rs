//! The change event announced after each company mutation.

use chrono::{DateTime, Utc};
use common::{Company, CompanyId};
use serde::{Deserialize, Serialize};

use crate::PublishError;

/// Kind of mutation a [`ChangeEvent`] announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Created,
    Updated,
    Deleted,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Created => "Created",
            OperationKind::Updated => "Updated",
            OperationKind::Deleted => "Deleted",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification that a company changed.
///
/// Created and Updated events carry the full company snapshot as stored.
/// Deleted events carry only the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub operation: OperationKind,
    pub entity_id: CompanyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    pub occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn created(company: Company) -> Self {
        Self::with_snapshot(OperationKind::Created, company)
    }

    pub fn updated(company: Company) -> Self {
        Self::with_snapshot(OperationKind::Updated, company)
    }

    pub fn deleted(entity_id: CompanyId) -> Self {
        Self {
            operation: OperationKind::Deleted,
            entity_id,
            company: None,
            occurred_at: Utc::now(),
        }
    }

    fn with_snapshot(operation: OperationKind, company: Company) -> Self {
        Self {
            operation,
            entity_id: company.id,
            company: Some(company),
            occurred_at: Utc::now(),
        }
    }

    /// Partition key for the message: the company identifier.
    pub fn key(&self) -> String {
        self.entity_id.to_string()
    }

    /// Encodes the event as a JSON message body.
    pub fn to_payload(&self) -> Result<Vec<u8>, PublishError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes an event from a JSON message body.
    pub fn from_payload(bytes: &[u8]) -> Result<Self, PublishError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use common::{CompanyType, NewCompany};

    use super::*;

    fn acme() -> Company {
        NewCompany {
            name: "Acme".to_string(),
            description: None,
            employee_count: 10,
            is_registered: true,
            company_type: CompanyType::SoleProprietorship,
        }
        .with_id(CompanyId::new())
    }

    #[test]
    fn created_event_carries_full_snapshot() {
        let company = acme();
        let event = ChangeEvent::created(company.clone());

        assert_eq!(event.operation, OperationKind::Created);
        assert_eq!(event.entity_id, company.id);
        assert_eq!(event.key(), company.id.to_string());

        let json: serde_json::Value = serde_json::from_slice(&event.to_payload().unwrap()).unwrap();
        assert_eq!(json["operation"], "Created");
        assert_eq!(json["entity_id"], company.id.to_string());
        assert_eq!(json["company"]["name"], "Acme");
        assert_eq!(json["company"]["type"], "SoleProprietorship");
    }

    #[test]
    fn deleted_event_carries_only_the_id() {
        let id = CompanyId::new();
        let event = ChangeEvent::deleted(id);

        let json: serde_json::Value = serde_json::from_slice(&event.to_payload().unwrap()).unwrap();
        assert_eq!(json["operation"], "Deleted");
        assert_eq!(json["entity_id"], id.to_string());
        assert!(json.get("company").is_none());
    }

    #[test]
    fn payload_decodes_back() {
        let event = ChangeEvent::updated(acme());
        let decoded = ChangeEvent::from_payload(&event.to_payload().unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn malformed_payload_is_a_serialization_error() {
        let result = ChangeEvent::from_payload(b"{not json");
        assert!(matches!(result, Err(PublishError::Serialization(_))));
    }
}
