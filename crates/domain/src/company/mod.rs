//! Company commands and the service that executes them.

pub mod commands;
pub mod service;

pub use commands::{CompanyPatch, CreateCompany, DeleteCompany, GetCompany, UpdateCompany};
pub use service::CompanyService;
