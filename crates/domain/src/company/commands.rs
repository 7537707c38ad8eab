//! Company commands.
//!
//! Commands arrive with identifiers as raw text so that a malformed
//! identifier is reported as an invalid request rather than a lookup miss.

use common::{Company, CompanyId, CompanyType, NewCompany};

use crate::error::CompanyError;

/// Command to create a company.
#[derive(Debug, Clone, Default)]
pub struct CreateCompany {
    pub name: String,
    pub description: Option<String>,
    pub employee_count: i32,
    pub is_registered: bool,
    pub company_type: CompanyType,
}

impl CreateCompany {
    /// Creates a command with the required fields; the rest take defaults.
    pub fn new(name: impl Into<String>, employee_count: i32) -> Self {
        Self {
            name: name.into(),
            employee_count,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn registered(mut self, is_registered: bool) -> Self {
        self.is_registered = is_registered;
        self
    }

    pub fn of_type(mut self, company_type: CompanyType) -> Self {
        self.company_type = company_type;
        self
    }

    /// Checks the command and turns it into the record to store.
    pub fn validate(self) -> Result<NewCompany, CompanyError> {
        let name = validate_name(&self.name)?;
        validate_employee_count(self.employee_count)?;

        Ok(NewCompany {
            name,
            description: self.description,
            employee_count: self.employee_count,
            is_registered: self.is_registered,
            company_type: self.company_type,
        })
    }
}

/// Fields to change on an existing company. `None` leaves a field as is.
///
/// `description` has three states: `None` keeps it, `Some(None)` clears it
/// and `Some(Some(text))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub employee_count: Option<i32>,
    pub is_registered: Option<bool>,
    pub company_type: Option<CompanyType>,
}

impl CompanyPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.employee_count.is_none()
            && self.is_registered.is_none()
            && self.company_type.is_none()
    }

    /// Merges the present fields into `company`.
    pub fn apply(self, mut company: Company) -> Company {
        if let Some(name) = self.name {
            company.name = name;
        }
        if let Some(description) = self.description {
            company.description = description;
        }
        if let Some(employee_count) = self.employee_count {
            company.employee_count = employee_count;
        }
        if let Some(is_registered) = self.is_registered {
            company.is_registered = is_registered;
        }
        if let Some(company_type) = self.company_type {
            company.company_type = company_type;
        }
        company
    }

    fn validate(self) -> Result<Self, CompanyError> {
        let name = self.name.as_deref().map(validate_name).transpose()?;
        if let Some(count) = self.employee_count {
            validate_employee_count(count)?;
        }
        Ok(Self { name, ..self })
    }
}

/// Command to change some fields of a company.
#[derive(Debug, Clone)]
pub struct UpdateCompany {
    pub id: String,
    pub patch: CompanyPatch,
}

impl UpdateCompany {
    pub fn new(id: impl Into<String>, patch: CompanyPatch) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }

    /// Checks the command and splits it into target and changes.
    pub fn validate(self) -> Result<(CompanyId, CompanyPatch), CompanyError> {
        let id = parse_id(&self.id)?;
        Ok((id, self.patch.validate()?))
    }
}

/// Command to delete a company.
#[derive(Debug, Clone)]
pub struct DeleteCompany {
    pub id: String,
}

impl DeleteCompany {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn validate(&self) -> Result<CompanyId, CompanyError> {
        parse_id(&self.id)
    }
}

/// Query for a single company.
#[derive(Debug, Clone)]
pub struct GetCompany {
    pub id: String,
}

impl GetCompany {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn validate(&self) -> Result<CompanyId, CompanyError> {
        parse_id(&self.id)
    }
}

fn parse_id(raw: &str) -> Result<CompanyId, CompanyError> {
    if raw.trim().is_empty() {
        return Err(CompanyError::invalid("company id is required"));
    }
    CompanyId::parse(raw).map_err(|e| CompanyError::invalid(e.to_string()))
}

// Stored names are trimmed so uniqueness is not defeated by whitespace.
fn validate_name(name: &str) -> Result<String, CompanyError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CompanyError::invalid("name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_employee_count(count: i32) -> Result<(), CompanyError> {
    if count < 0 {
        return Err(CompanyError::invalid(format!(
            "employee_count must not be negative, got {count}"
        )));
    }
    Ok(())
}
