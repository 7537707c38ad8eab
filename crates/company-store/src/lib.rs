//! Company storage.
//!
//! The [`CompanyStore`] trait is the only persistence contract the rest of
//! the system sees. [`PostgresCompanyStore`] is the store of record;
//! [`InMemoryCompanyStore`] mirrors its behavior for tests and local runs.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{Company, CompanyId, CompanyType, NewCompany};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::{InMemoryCompanyStore, StoreFailure};
pub use postgres::PostgresCompanyStore;
pub use store::CompanyStore;
