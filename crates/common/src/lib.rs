//! Shared types for the company service.
//!
//! The company record and its identifier live here so that the store,
//! the publisher and the coordinator agree on a single representation.

pub mod company;
pub mod types;

pub use company::{Company, CompanyType, NewCompany};
pub use types::{CompanyId, ParseCompanyIdError};
