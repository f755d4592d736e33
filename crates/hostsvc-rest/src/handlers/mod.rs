//! Route handlers, assembled into a single Axum router.

pub mod jes;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new().merge(jes::routes()).with_state(state)
}
