//! `/jes`: job submission.
//!
//! - `PUT  /jes`: submit inline JCL (`{"jcl": ...}`) or a dataset (`{"file": ...}`)
//! - `POST /jes`: same as `PUT`
//!
//! Any other method gets `405` with an `Allow` header.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{put, MethodRouter};
use axum::{Json, Router};
use hostsvc_encoding::Ccsid;

use crate::state::AppState;
use crate::submit::SubmitError;
use crate::types::error::ErrorResponse;
use crate::types::jes::{SubmitQuery, SubmitResponse};

/// Methods `/jes` accepts.
pub const ALLOWED_METHODS: &str = "PUT, POST";

/// Register `/jes` routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jes", jes_methods())
        .route("/jes/", jes_methods())
}

fn jes_methods() -> MethodRouter<Arc<AppState>> {
    put(submit_job).post(submit_job).fallback(method_not_allowed)
}

/// PUT/POST /jes: submit a job.
async fn submit_job(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubmitQuery>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<SubmitResponse>, ErrorResponse> {
    let bytes = axum::body::to_bytes(body, state.config.submit.max_body_bytes)
        .await
        .map_err(|_| SubmitError::BodyUnreadable)?;
    let charset = request_charset(&headers)?;
    let force = query.force();

    let orchestrator = Arc::clone(&state.orchestrator);
    let job_id = tokio::task::spawn_blocking(move || orchestrator.handle(&bytes, charset, force))
        .await
        .map_err(|e| SubmitError::Internal(format!("submission task failed: {e}")))??;

    Ok(Json(SubmitResponse {
        job_id: job_id.to_string(),
    }))
}

async fn method_not_allowed() -> Response {
    (
        [(header::ALLOW, ALLOWED_METHODS)],
        ErrorResponse::method_not_allowed(format!(
            "Method not allowed; use {ALLOWED_METHODS}"
        )),
    )
        .into_response()
}

/// Charset named by the `Content-Type` header, UTF-8 when absent.
fn request_charset(headers: &HeaderMap) -> Result<Ccsid, SubmitError> {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(Ccsid::UTF_8);
    };
    for param in content_type.split(';').skip(1) {
        if let Some((name, value)) = param.split_once('=') {
            if name.trim().eq_ignore_ascii_case("charset") {
                return Ok(Ccsid::from_name(value)?);
            }
        }
    }
    Ok(Ccsid::UTF_8)
}
