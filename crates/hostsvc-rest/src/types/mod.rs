//! Request and response types for the REST API.

pub mod error;
pub mod jes;
