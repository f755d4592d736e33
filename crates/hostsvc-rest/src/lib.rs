//! # hostsvc REST API
//!
//! HTTP front end for batch job submission. A `PUT` or `POST` to `/jes`
//! carries either inline job-control text or the name of a dataset holding
//! it; the service formats it into fixed-length records, feeds the internal
//! reader, and answers with the job identifier.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hostsvc_rest::{build_router, config::ServiceConfig};
//!
//! # async fn example() {
//! let router = build_router(ServiceConfig::default()).unwrap();
//! // router can be served via axum::serve()
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod handlers;
pub mod state;
pub mod submit;
pub mod types;

pub use config::ServiceConfig;
pub use state::AppState;

use std::sync::Arc;

/// Build the Axum router backed by the emulated host in `config`.
pub fn build_router(config: ServiceConfig) -> std::result::Result<axum::Router, config::ConfigError> {
    let state = Arc::new(AppState::new(config)?);
    Ok(handlers::build_router(state))
}

/// Convenience result type for handlers.
pub type Result<T> = std::result::Result<T, types::error::ErrorResponse>;
