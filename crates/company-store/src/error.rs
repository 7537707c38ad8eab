use thiserror::Error;

use crate::CompanyId;

/// SQLSTATE `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

/// Errors that can occur when interacting with the company store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No live row matches the identifier.
    #[error("Company not found: {0}")]
    NotFound(CompanyId),

    /// A uniqueness or domain constraint was broken by the write.
    #[error("Constraint violation ({constraint}): {message}")]
    ConstraintViolation { constraint: String, message: String },

    /// The backing database could not be reached in time.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other database error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Builds a uniqueness violation for the company name.
    pub fn duplicate_name(name: &str) -> Self {
        StoreError::ConstraintViolation {
            constraint: "companies_name_key".to_string(),
            message: format!("a company named {name:?} already exists"),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err)
                if db_err.is_unique_violation()
                    || db_err.is_check_violation()
                    || db_err.is_foreign_key_violation() =>
            {
                StoreError::ConstraintViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                    message: db_err.message().to_string(),
                }
            }
            // The server cancelled the statement, so its transaction rolled back.
            sqlx::Error::Database(ref db_err)
                if db_err.code().as_deref() == Some(QUERY_CANCELED) =>
            {
                StoreError::Unavailable(db_err.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct ServerError {
        code: &'static str,
        message: &'static str,
        unique: bool,
    }

    impl std::fmt::Display for ServerError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for ServerError {}

    impl DatabaseError for ServerError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn server_error(code: &'static str, message: &'static str, unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ServerError {
            code,
            message,
            unique,
        }))
    }

    #[test]
    fn statement_timeout_is_unavailable() {
        let err = StoreError::from(server_error(
            "57014",
            "canceling statement due to statement timeout",
            false,
        ));

        match err {
            StoreError::Unavailable(message) => assert!(message.contains("statement timeout")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unique_violation_is_constraint_violation() {
        let err = StoreError::from(server_error(
            "23505",
            "duplicate key value violates unique constraint",
            true,
        ));
        assert!(matches!(err, StoreError::ConstraintViolation { .. }));
    }

    #[test]
    fn other_server_errors_stay_database_errors() {
        let err = StoreError::from(server_error(
            "42P01",
            "relation \"companies\" does not exist",
            false,
        ));
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn io_failure_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::from(sqlx::Error::Io(io));
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn row_not_found_stays_a_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn duplicate_name_names_the_constraint() {
        match StoreError::duplicate_name("Acme") {
            StoreError::ConstraintViolation { constraint, message } => {
                assert_eq!(constraint, "companies_name_key");
                assert!(message.contains("Acme"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
