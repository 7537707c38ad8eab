use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    Company, CompanyId, CompanyType, NewCompany, Result, StoreConfig, StoreError,
    store::CompanyStore,
};

const COMPANY_COLUMNS: &str = "id, name, description, employee_count, is_registered, type";

// Headroom for the server to cancel a statement and report back before the
// client-side guard gives up on it.
const CLIENT_GUARD_GRACE: Duration = Duration::from_secs(1);

/// PostgreSQL-backed company store.
#[derive(Clone)]
pub struct PostgresCompanyStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresCompanyStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Opens a connection pool using the given settings.
    ///
    /// Every connection carries a server-side `statement_timeout` equal to
    /// the query timeout, so a statement that runs too long is cancelled and
    /// rolled back by PostgreSQL. Fails with `Unavailable` if the database
    /// cannot be reached within the connect timeout.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let connecting = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(Self::connect_options(config)?);

        let pool = tokio::time::timeout(config.connect_timeout, connecting)
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!(
                    "could not connect within {:?}",
                    config.connect_timeout
                ))
            })??;

        tracing::info!(
            max_connections = config.max_connections,
            statement_timeout = ?config.query_timeout,
            "connected to PostgreSQL company store"
        );

        Ok(Self::new(pool, config.query_timeout))
    }

    fn connect_options(config: &StoreConfig) -> Result<PgConnectOptions> {
        let statement_timeout = format!("{}ms", config.query_timeout.as_millis());
        Ok(PgConnectOptions::from_str(&config.database_url)?
            .options([("statement_timeout", statement_timeout)]))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Time allowed for a statement on the client before it is abandoned.
    ///
    /// Longer than the server-side `statement_timeout`, so a slow write is
    /// normally cancelled (and rolled back) by PostgreSQL first.
    fn client_guard(&self) -> Duration {
        self.query_timeout + CLIENT_GUARD_GRACE
    }

    /// Runs a statement under the client guard and records its duration.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let guard = self.client_guard();
        let started = Instant::now();
        let outcome = tokio::time::timeout(guard, fut).await;
        metrics::histogram!("company_store_query_duration_seconds", "operation" => operation)
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(result) => result.map_err(|e| {
                let err = StoreError::from(e);
                if matches!(err, StoreError::Unavailable(_)) {
                    tracing::warn!(operation, error = %err, "store query failed");
                }
                err
            }),
            Err(_) => {
                tracing::warn!(operation, timeout = ?guard, "store query timed out");
                Err(StoreError::Unavailable(format!(
                    "{operation} timed out after {guard:?}"
                )))
            }
        }
    }

    fn row_to_company(row: PgRow) -> Result<Company> {
        let code: i16 = row.try_get("type")?;
        Ok(Company {
            id: CompanyId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            employee_count: row.try_get("employee_count")?,
            is_registered: row.try_get("is_registered")?,
            company_type: CompanyType::from_code(code.into()),
        })
    }
}

#[async_trait]
impl CompanyStore for PostgresCompanyStore {
    async fn create(&self, company: NewCompany) -> Result<Company> {
        let sql = format!(
            r#"
            INSERT INTO companies (name, description, employee_count, is_registered, type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMPANY_COLUMNS}
            "#
        );

        let row = self
            .bounded(
                "create",
                sqlx::query(&sql)
                    .bind(&company.name)
                    .bind(&company.description)
                    .bind(company.employee_count)
                    .bind(company.is_registered)
                    .bind(company.company_type.code())
                    .fetch_one(&self.pool),
            )
            .await?;

        Self::row_to_company(row)
    }

    async fn get(&self, id: CompanyId) -> Result<Company> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1");

        let row: Option<PgRow> = self
            .bounded(
                "get",
                sqlx::query(&sql)
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => Self::row_to_company(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn update(&self, company: &Company) -> Result<Company> {
        let sql = format!(
            r#"
            UPDATE companies
            SET name = $1, description = $2, employee_count = $3, is_registered = $4, type = $5
            WHERE id = $6
            RETURNING {COMPANY_COLUMNS}
            "#
        );

        let row: Option<PgRow> = self
            .bounded(
                "update",
                sqlx::query(&sql)
                    .bind(&company.name)
                    .bind(&company.description)
                    .bind(company.employee_count)
                    .bind(company.is_registered)
                    .bind(company.company_type.code())
                    .bind(company.id.as_uuid())
                    .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => Self::row_to_company(row),
            None => Err(StoreError::NotFound(company.id)),
        }
    }

    async fn delete(&self, id: CompanyId) -> Result<()> {
        // Affected-row count decides NotFound; no read-then-delete race.
        let result = self
            .bounded(
                "delete",
                sqlx::query("DELETE FROM companies WHERE id = $1")
                    .bind(id.as_uuid())
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}
