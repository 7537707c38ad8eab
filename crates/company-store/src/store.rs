use std::sync::Arc;

use async_trait::async_trait;

use crate::{Company, CompanyId, NewCompany, Result};

/// Core trait for company store implementations.
///
/// Each operation is scoped to a single company and is atomic on its own.
/// There are no cross-company transactions. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Persists a new company and returns the stored row.
    ///
    /// The store assigns the identifier. Fails with `ConstraintViolation`
    /// when the name is already taken by a live company.
    async fn create(&self, company: NewCompany) -> Result<Company>;

    /// Loads a company by identifier.
    ///
    /// Fails with `NotFound` if no row matches.
    async fn get(&self, id: CompanyId) -> Result<Company>;

    /// Replaces every mutable field of an existing company.
    ///
    /// Fails with `NotFound` if the identifier no longer exists.
    async fn update(&self, company: &Company) -> Result<Company>;

    /// Hard-deletes a company.
    ///
    /// Fails with `NotFound` when no row was affected.
    async fn delete(&self, id: CompanyId) -> Result<()>;
}

#[async_trait]
impl<T: CompanyStore + ?Sized> CompanyStore for Arc<T> {
    async fn create(&self, company: NewCompany) -> Result<Company> {
        (**self).create(company).await
    }

    async fn get(&self, id: CompanyId) -> Result<Company> {
        (**self).get(id).await
    }

    async fn update(&self, company: &Company) -> Result<Company> {
        (**self).update(company).await
    }

    async fn delete(&self, id: CompanyId) -> Result<()> {
        (**self).delete(id).await
    }
}
