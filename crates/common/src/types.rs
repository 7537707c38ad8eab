use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a company.
///
/// Wraps a UUID to keep company identifiers from being mixed up with
/// other UUID-based values. Identifiers are assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(Uuid);

impl CompanyId {
    /// Creates a new random company ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a company ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a company ID from its textual form.
    pub fn parse(input: &str) -> Result<Self, ParseCompanyIdError> {
        input.parse()
    }
}

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompanyId {
    type Err = ParseCompanyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ParseCompanyIdError {
                input: s.to_string(),
            })
    }
}

impl From<Uuid> for CompanyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CompanyId> for Uuid {
    fn from(id: CompanyId) -> Self {
        id.0
    }
}

/// Error returned when a string is not a valid company identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCompanyIdError {
    pub input: String,
}

impl std::fmt::Display for ParseCompanyIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid company id: {:?}", self.input)
    }
}

impl std::error::Error for ParseCompanyIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_id_new_creates_unique_ids() {
        let id1 = CompanyId::new();
        let id2 = CompanyId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn company_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = CompanyId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn parse_accepts_hyphenated_uuid() {
        let id = CompanyId::parse("121f03cd-ce8c-447d-8747-fb8cb7aa3a52").unwrap();
        assert_eq!(id.to_string(), "121f03cd-ce8c-447d-8747-fb8cb7aa3a52");
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = CompanyId::parse("not-a-uuid").unwrap_err();
        assert_eq!(err.input, "not-a-uuid");
        assert!(CompanyId::parse("").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CompanyId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
