//! The company record and its classification.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CompanyId;

/// Legal form of a company.
///
/// The set is closed. Input that does not name a known form resolves to
/// [`CompanyType::Unknown`] instead of being rejected. Persisted as the
/// integer code returned by [`CompanyType::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompanyType {
    Corporation,
    NonProfit,
    Cooperative,
    SoleProprietorship,
    #[default]
    Unknown,
}

impl CompanyType {
    pub const ALL: [CompanyType; 5] = [
        CompanyType::Corporation,
        CompanyType::NonProfit,
        CompanyType::Cooperative,
        CompanyType::SoleProprietorship,
        CompanyType::Unknown,
    ];

    /// Returns the integer code used in storage.
    pub fn code(&self) -> i16 {
        match self {
            CompanyType::Corporation => 0,
            CompanyType::NonProfit => 1,
            CompanyType::Cooperative => 2,
            CompanyType::SoleProprietorship => 3,
            CompanyType::Unknown => 4,
        }
    }

    /// Resolves a storage code. Codes outside the known range are `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => CompanyType::Corporation,
            1 => CompanyType::NonProfit,
            2 => CompanyType::Cooperative,
            3 => CompanyType::SoleProprietorship,
            _ => CompanyType::Unknown,
        }
    }

    /// Resolves a textual name.
    ///
    /// Matching ignores case, spaces, hyphens and underscores, so
    /// `"Sole Proprietorship"` and `"sole_proprietorship"` both resolve.
    /// A few common spellings ("corporations", "nonprofit", "coop") are
    /// accepted as well.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "corporation" | "corporations" | "corp" => CompanyType::Corporation,
            "nonprofit" | "notforprofit" => CompanyType::NonProfit,
            "cooperative" | "coop" => CompanyType::Cooperative,
            "soleproprietorship" => CompanyType::SoleProprietorship,
            _ => CompanyType::Unknown,
        }
    }

    /// Returns the canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyType::Corporation => "Corporation",
            CompanyType::NonProfit => "NonProfit",
            CompanyType::Cooperative => "Cooperative",
            CompanyType::SoleProprietorship => "SoleProprietorship",
            CompanyType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for CompanyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CompanyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CompanyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(i64),
            Name(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Code(code) => CompanyType::from_code(code),
            Repr::Name(name) => CompanyType::from_name(&name),
        })
    }
}

/// Field values for a company that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub employee_count: i32,
    pub is_registered: bool,
    pub company_type: CompanyType,
}

impl NewCompany {
    /// Attaches a store-assigned identifier.
    pub fn with_id(self, id: CompanyId) -> Company {
        Company {
            id,
            name: self.name,
            description: self.description,
            employee_count: self.employee_count,
            is_registered: self.is_registered,
            company_type: self.company_type,
        }
    }
}

/// A persisted company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: Option<String>,
    pub employee_count: i32,
    pub is_registered: bool,
    #[serde(rename = "type")]
    pub company_type: CompanyType,
}
