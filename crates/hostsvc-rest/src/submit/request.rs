//! Decoding the `/jes` request body.

use hostsvc_encoding::{Ccsid, Charset};
use serde_json::{Map, Value};

use super::error::SubmitError;

/// What is being submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionKind {
    /// Job-control text, UTF-8.
    InlineText(String),
    /// A dataset reference such as `IBMUSER.JCL(PAYROLL)`.
    DatasetReference(String),
}

/// A decoded submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Payload.
    pub kind: SubmissionKind,
    /// The `force` query flag.
    pub force: bool,
}

/// The string value of `key`, if present and a string.
pub fn get_string<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

impl SubmissionRequest {
    /// Decode a body encoded in `charset`.
    ///
    /// Exactly one of `file` and `jcl` must be present. `file` is taken as a
    /// dataset reference; `jcl` as inline text.
    pub fn decode(
        converter: &dyn Charset,
        body: &[u8],
        charset: Ccsid,
        force: bool,
    ) -> Result<Self, SubmitError> {
        let utf8 = converter.convert(body, charset, Ccsid::UTF_8)?;
        let value: Value = serde_json::from_slice(&utf8)
            .map_err(|_| SubmitError::InvalidBody("Body could not be parsed as JSON".to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| SubmitError::InvalidBody("Body must be a JSON object".to_string()))?;

        let kind = match (get_string(object, "file"), get_string(object, "jcl")) {
            (Some(_), Some(_)) => return Err(SubmitError::AmbiguousPayload),
            (Some(file), None) => SubmissionKind::DatasetReference(file.to_string()),
            (None, Some(jcl)) => SubmissionKind::InlineText(jcl.to_string()),
            (None, None) => return Err(SubmitError::MissingPayload),
        };
        Ok(Self { kind, force })
    }
}
