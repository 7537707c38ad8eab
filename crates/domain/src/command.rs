//! Command plumbing shared by every company operation.

use common::{Company, CompanyId};
use publisher::{ChangeEvent, OperationKind};

use crate::error::CompanyError;

/// What the caller is allowed to do.
///
/// Derived from the caller's credentials by the transport layer. Reads need
/// no capability; every mutation needs [`Capability::Write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capability {
    #[default]
    ReadOnly,
    Write,
}

impl Capability {
    /// Maps an authentication result onto a capability.
    pub fn from_authenticated(authenticated: bool) -> Self {
        if authenticated {
            Capability::Write
        } else {
            Capability::ReadOnly
        }
    }

    /// Returns true if mutations are allowed.
    pub fn can_write(self) -> bool {
        matches!(self, Capability::Write)
    }

    pub(crate) fn require_write(self, operation: &'static str) -> Result<(), CompanyError> {
        if self.can_write() {
            Ok(())
        } else {
            Err(CompanyError::Unauthorized { operation })
        }
    }
}

/// A change that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed {
    /// The company as stored after a create or update.
    Company(Company),
    /// The identifier of a deleted company.
    Deleted(CompanyId),
}

impl Committed {
    /// Identifier of the affected company.
    pub fn company_id(&self) -> CompanyId {
        match self {
            Committed::Company(company) => company.id,
            Committed::Deleted(id) => *id,
        }
    }

    /// Builds the change event announcing this outcome.
    pub fn event(&self, operation: OperationKind) -> ChangeEvent {
        match (self, operation) {
            (Committed::Deleted(id), _) => ChangeEvent::deleted(*id),
            (Committed::Company(company), OperationKind::Created) => {
                ChangeEvent::created(company.clone())
            }
            (Committed::Company(company), _) => ChangeEvent::updated(company.clone()),
        }
    }
}

impl From<Company> for Committed {
    fn from(company: Company) -> Self {
        Committed::Company(company)
    }
}

impl From<CompanyId> for Committed {
    fn from(id: CompanyId) -> Self {
        Committed::Deleted(id)
    }
}
