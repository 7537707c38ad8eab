//! HTTP route handlers.

pub mod companies;
pub mod system;
