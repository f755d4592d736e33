//! Job identifiers and queued job records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SinkError;

/// Job number assigned by the queue; displays as `JOBnnnnn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JOB{:05}", self.0)
    }
}

/// Width of the completion token.
pub const JOB_ID_LEN: usize = 8;

/// The 8-character completion token returned when a submission closes.
///
/// Never blank: a blank token is reported as [`SinkError::JobIdMissing`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobIdentifier(String);

impl JobIdentifier {
    /// Interpret a fixed-width completion token. Trailing blanks and NULs are
    /// padding; an empty remainder means no job was created.
    pub fn from_token(token: &[u8; JOB_ID_LEN]) -> Result<Self, SinkError> {
        let text: String = token
            .iter()
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim_end_matches([' ', '\0'])
            .to_string();
        if text.trim().is_empty() {
            return Err(SinkError::JobIdMissing);
        }
        Ok(Self(format!("{:<width$}", text, width = JOB_ID_LEN)))
    }

    /// The token as an 8-character string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<JobId> for JobIdentifier {
    fn from(id: JobId) -> Self {
        Self(format!("{:<width$}", id.to_string(), width = JOB_ID_LEN))
    }
}

impl fmt::Display for JobIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job accepted by the internal reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedJob {
    /// Assigned job number.
    pub id: JobId,
    /// Name from the JOB statement.
    pub name: String,
    /// Execution class (`CLASS=`, default `A`).
    pub class: char,
    /// Selection priority (`PRTY=`, default 1).
    pub priority: u8,
    /// The submitted records, decoded.
    pub records: Vec<String>,
    /// When the job was queued.
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_display() {
        assert_eq!(JobId(42).to_string(), "JOB00042");
        assert_eq!(JobIdentifier::from(JobId(7)).as_str(), "JOB00007");
    }

    #[test]
    fn blank_token_is_missing() {
        assert_eq!(
            JobIdentifier::from_token(b"        ").unwrap_err(),
            SinkError::JobIdMissing
        );
        assert_eq!(
            JobIdentifier::from_token(&[0; JOB_ID_LEN]).unwrap_err(),
            SinkError::JobIdMissing
        );
    }

    #[test]
    fn short_token_is_padded() {
        let id = JobIdentifier::from_token(b"J0001\0\0\0").unwrap();
        assert_eq!(id.as_str(), "J0001   ");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"J0001   \"");
    }
}
