//! Company service: validates commands, writes to the store and announces
//! every stored change.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use common::{Company, CompanyId};
use company_store::CompanyStore;
use publisher::{EventPublisher, OperationKind};
use tracing::Instrument;

use crate::command::{Capability, Committed};
use crate::error::CompanyError;

use super::{CreateCompany, DeleteCompany, GetCompany, UpdateCompany};

/// Coordinates company mutations.
///
/// A mutation goes through validation, then the store write, then the
/// change event. A store failure stops the mutation before anything is
/// published. A publish failure after a successful write is reported as
/// [`CompanyError::NotificationFailed`]; the write is not rolled back.
///
/// The store write and the publish run on a spawned task, so a caller that
/// gives up after the write was issued does not suppress the event.
pub struct CompanyService<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
}

impl<S, P> Clone for CompanyService<S, P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<S, P> CompanyService<S, P>
where
    S: CompanyStore + 'static,
    P: EventPublisher + 'static,
{
    /// Creates a new company service.
    pub fn new(store: S, publisher: P) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(publisher))
    }

    /// Creates a service around handles that are shared elsewhere.
    pub fn from_shared(store: Arc<S>, publisher: Arc<P>) -> Self {
        Self { store, publisher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Creates a company and announces it.
    #[tracing::instrument(skip(self), fields(publisher = self.publisher.name()))]
    pub async fn create_company(
        &self,
        capability: Capability,
        cmd: CreateCompany,
    ) -> Result<Company, CompanyError> {
        let started = Instant::now();
        let result = async {
            capability.require_write("create")?;
            let new_company = cmd.validate()?;

            let store = Arc::clone(&self.store);
            self.commit(OperationKind::Created, async move {
                store.create(new_company).await
            })
            .await
        }
        .await;
        record_outcome(OperationKind::Created, started, &result);
        result
    }

    /// Applies a partial update and announces the new state.
    ///
    /// The current state is read first; fields absent from the patch keep
    /// their stored values.
    #[tracing::instrument(skip(self), fields(publisher = self.publisher.name()))]
    pub async fn update_company(
        &self,
        capability: Capability,
        cmd: UpdateCompany,
    ) -> Result<Company, CompanyError> {
        let started = Instant::now();
        let result = async {
            capability.require_write("update")?;
            let (id, patch) = cmd.validate()?;

            let current = self.store.get(id).await?;
            let merged = patch.apply(current);

            let store = Arc::clone(&self.store);
            self.commit(OperationKind::Updated, async move {
                store.update(&merged).await
            })
            .await
        }
        .await;
        record_outcome(OperationKind::Updated, started, &result);
        result
    }

    /// Deletes a company and announces the deletion.
    #[tracing::instrument(skip(self), fields(publisher = self.publisher.name()))]
    pub async fn delete_company(
        &self,
        capability: Capability,
        cmd: DeleteCompany,
    ) -> Result<CompanyId, CompanyError> {
        let started = Instant::now();
        let result = async {
            capability.require_write("delete")?;
            let id = cmd.validate()?;

            let store = Arc::clone(&self.store);
            self.commit(OperationKind::Deleted, async move {
                store.delete(id).await.map(|()| id)
            })
            .await
        }
        .await;
        record_outcome(OperationKind::Deleted, started, &result);
        result
    }

    /// Loads a company. Never publishes.
    #[tracing::instrument(skip(self))]
    pub async fn get_company(&self, cmd: GetCompany) -> Result<Company, CompanyError> {
        let id = cmd.validate()?;
        let result = self.store.get(id).await.map_err(CompanyError::from);

        let outcome = match &result {
            Ok(_) => "found",
            Err(e) => e.kind(),
        };
        metrics::counter!("company_reads_total", "outcome" => outcome).increment(1);
        result
    }

    /// Runs the store write and the publish on their own task.
    async fn commit<T, W>(&self, operation: OperationKind, write: W) -> Result<T, CompanyError>
    where
        T: Clone + Into<Committed> + Send + 'static,
        W: Future<Output = company_store::Result<T>> + Send + 'static,
    {
        let publisher = Arc::clone(&self.publisher);

        let task = tokio::spawn(async move {
            let stored = write.await.map_err(CompanyError::from)?;
            let committed: Committed = stored.clone().into();
            tracing::debug!(company_id = %committed.company_id(), %operation, "change stored");

            let event = committed.event(operation);
            match publisher.publish(&event).await {
                Ok(()) => {
                    tracing::info!(company_id = %committed.company_id(), %operation, "change published");
                    Ok(stored)
                }
                Err(source) => {
                    tracing::error!(
                        company_id = %committed.company_id(),
                        %operation,
                        stored = true,
                        notified = false,
                        error = %source,
                        "change stored but notification failed"
                    );
                    metrics::counter!(
                        "company_notifications_failed_total",
                        "operation" => operation.as_str()
                    )
                    .increment(1);
                    Err(CompanyError::NotificationFailed {
                        committed,
                        operation,
                        source,
                    })
                }
            }
        }
        .in_current_span());

        task.await
            .map_err(|e| CompanyError::Internal(format!("mutation task failed: {e}")))?
    }
}

fn record_outcome<T>(operation: OperationKind, started: Instant, result: &Result<T, CompanyError>) {
    let outcome = match result {
        Ok(_) => "completed",
        Err(e) => e.kind(),
    };
    metrics::counter!(
        "company_mutations_total",
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "company_mutation_duration_seconds",
        "operation" => operation.as_str()
    )
    .record(started.elapsed().as_secs_f64());
}
