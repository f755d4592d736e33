//! `/jes` request and response types.

use serde::{Deserialize, Serialize};

/// Successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Job identifier, 8 characters.
    #[serde(rename = "jobId")]
    pub job_id: String,
}

/// Query parameters accepted by `/jes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitQuery {
    /// `force=true` is accepted and recorded but changes nothing.
    #[serde(default)]
    pub force: Option<String>,
}

impl SubmitQuery {
    /// Whether `force` was given a true value.
    pub fn force(&self) -> bool {
        self.force
            .as_deref()
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "1"))
            .unwrap_or(false)
    }
}
