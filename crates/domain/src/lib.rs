//! Domain layer for the company service.
//!
//! This crate provides:
//! - Company commands and their validation
//! - `Capability` for write authorization
//! - `CompanyService`, which stores every change and then announces it
//! - `CompanyError`, the error taxonomy callers map onto their transport

pub mod command;
pub mod company;
pub mod error;

pub use command::{Capability, Committed};
pub use company::{
    CompanyPatch, CompanyService, CreateCompany, DeleteCompany, GetCompany, UpdateCompany,
};
pub use error::CompanyError;

pub use common::{Company, CompanyId, CompanyType};
pub use publisher::OperationKind;
