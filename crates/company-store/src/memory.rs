use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Company, CompanyId, NewCompany, Result, StoreError, store::CompanyStore};

/// A failure the in-memory store can be told to produce on writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
    /// Behave as if the database were unreachable.
    Unavailable,
    /// Behave as if a domain constraint rejected the write.
    ConstraintViolation,
}

impl StoreFailure {
    fn into_error(self) -> StoreError {
        match self {
            StoreFailure::Unavailable => {
                StoreError::Unavailable("injected store outage".to_string())
            }
            StoreFailure::ConstraintViolation => StoreError::ConstraintViolation {
                constraint: "injected".to_string(),
                message: "injected constraint violation".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct Hooks {
    write_failure: Option<StoreFailure>,
    latency: Option<Duration>,
}

/// In-memory company store for tests and local runs.
///
/// Enforces the same invariants as the PostgreSQL schema (unique names,
/// non-negative employee counts) and exposes call counters and fault
/// injection so callers can observe what the store was asked to do.
#[derive(Clone, Default)]
pub struct InMemoryCompanyStore {
    companies: Arc<RwLock<HashMap<CompanyId, Company>>>,
    hooks: Arc<RwLock<Hooks>>,
    calls: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryCompanyStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored companies.
    pub async fn len(&self) -> usize {
        self.companies.read().await.len()
    }

    /// Returns true if no companies are stored.
    pub async fn is_empty(&self) -> bool {
        self.companies.read().await.is_empty()
    }

    /// Total number of store operations invoked, reads included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of create, update and delete operations invoked.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent write fail with the given failure. Reads are
    /// unaffected. Pass `None` to restore normal behavior.
    pub async fn fail_writes_with(&self, failure: Option<StoreFailure>) {
        self.hooks.write().await.write_failure = failure;
    }

    /// Delays every write by the given duration before it is applied.
    pub async fn set_write_latency(&self, latency: Option<Duration>) {
        self.hooks.write().await.latency = latency;
    }

    async fn begin_write(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);

        let (failure, latency) = {
            let hooks = self.hooks.read().await;
            (hooks.write_failure, hooks.latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match failure {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn check_constraints(
        companies: &HashMap<CompanyId, Company>,
        candidate: &Company,
    ) -> Result<()> {
        if candidate.employee_count < 0 {
            return Err(StoreError::ConstraintViolation {
                constraint: "companies_employee_count_check".to_string(),
                message: format!(
                    "employee_count must be non-negative, got {}",
                    candidate.employee_count
                ),
            });
        }

        let name_taken = companies
            .values()
            .any(|c| c.id != candidate.id && c.name == candidate.name);
        if name_taken {
            return Err(StoreError::duplicate_name(&candidate.name));
        }

        Ok(())
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn create(&self, company: NewCompany) -> Result<Company> {
        self.begin_write().await?;

        let mut companies = self.companies.write().await;
        let company = company.with_id(CompanyId::new());
        Self::check_constraints(&companies, &company)?;

        companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn get(&self, id: CompanyId) -> Result<Company> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.companies
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, company: &Company) -> Result<Company> {
        self.begin_write().await?;

        let mut companies = self.companies.write().await;
        if !companies.contains_key(&company.id) {
            return Err(StoreError::NotFound(company.id));
        }
        Self::check_constraints(&companies, company)?;

        companies.insert(company.id, company.clone());
        Ok(company.clone())
    }

    async fn delete(&self, id: CompanyId) -> Result<()> {
        self.begin_write().await?;

        match self.companies.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompanyType;

    fn acme() -> NewCompany {
        NewCompany {
            name: "Acme".to_string(),
            description: Some("Anvils and rockets".to_string()),
            employee_count: 10,
            is_registered: true,
            company_type: CompanyType::SoleProprietorship,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_get_returns_row() {
        let store = InMemoryCompanyStore::new();

        let created = store.create(acme()).await.unwrap();
        let loaded = store.get(created.id).await.unwrap();

        assert_eq!(loaded, created);
        assert_eq!(loaded.name, "Acme");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_name_is_a_constraint_violation() {
        let store = InMemoryCompanyStore::new();
        store.create(acme()).await.unwrap();

        let result = store.create(acme()).await;

        assert!(matches!(
            result,
            Err(StoreError::ConstraintViolation { .. })
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_to_a_taken_name_is_rejected() {
        let store = InMemoryCompanyStore::new();
        store.create(acme()).await.unwrap();
        let other = store
            .create(NewCompany {
                name: "Globex".to_string(),
                ..acme()
            })
            .await
            .unwrap();

        let renamed = Company {
            name: "Acme".to_string(),
            ..other.clone()
        };
        let result = store.update(&renamed).await;

        assert!(matches!(
            result,
            Err(StoreError::ConstraintViolation { .. })
        ));
        assert_eq!(store.get(other.id).await.unwrap().name, "Globex");
    }

    #[tokio::test]
    async fn update_keeps_own_name() {
        let store = InMemoryCompanyStore::new();
        let created = store.create(acme()).await.unwrap();

        let updated = store
            .update(&Company {
                employee_count: 12,
                ..created.clone()
            })
            .await
            .unwrap();

        assert_eq!(updated.employee_count, 12);
        assert_eq!(updated.name, created.name);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let store = InMemoryCompanyStore::new();
        let ghost = acme().with_id(CompanyId::new());

        let result = store.update(&ghost).await;

        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == ghost.id));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let store = InMemoryCompanyStore::new();
        let created = store.create(acme()).await.unwrap();

        store.delete(created.id).await.unwrap();

        assert!(matches!(
            store.get(created.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn injected_failure_affects_writes_only() {
        let store = InMemoryCompanyStore::new();
        let created = store.create(acme()).await.unwrap();
        store
            .fail_writes_with(Some(StoreFailure::Unavailable))
            .await;

        assert!(store.get(created.id).await.is_ok());
        assert!(matches!(
            store.delete(created.id).await,
            Err(StoreError::Unavailable(_))
        ));

        store.fail_writes_with(None).await;
        assert!(store.delete(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn counters_track_reads_and_writes() {
        let store = InMemoryCompanyStore::new();
        let created = store.create(acme()).await.unwrap();
        store.get(created.id).await.unwrap();

        assert_eq!(store.call_count(), 2);
        assert_eq!(store.write_count(), 1);
    }
}
