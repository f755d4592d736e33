//! Submission failures and their HTTP rendering.

use axum::http::StatusCode;
use hostsvc_dynalloc::{DatasetError, DynallocError, NameError, Translation};
use hostsvc_encoding::EncodingError;
use hostsvc_intrdr::SinkError;
use thiserror::Error;

use crate::types::error::ErrorResponse;

/// Broad class of a submission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad request content; no resource was touched.
    Validation,
    /// The dataset is held by someone else.
    Contention,
    /// A device, catalog or dataset could not be reached.
    Availability,
    /// Allocation failed for another reason.
    Allocation,
    /// Writing to the internal reader failed.
    Stream,
    /// The internal reader returned no job identifier.
    ResultMissing,
    /// Conversion or infrastructure failure.
    Internal,
}

/// Why a submission failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request body could not be read.
    #[error("Request body could not be read")]
    BodyUnreadable,

    /// Charset conversion of the body or the JCL failed.
    #[error("Charset conversion failed: {0}")]
    Conversion(#[from] EncodingError),

    /// The body is not a JSON object.
    #[error("{0}")]
    InvalidBody(String),

    /// Neither `file` nor `jcl` was given.
    #[error("Request body has no file or jcl value")]
    MissingPayload,

    /// Both `file` and `jcl` were given.
    #[error("Request body must contain only one of file or jcl")]
    AmbiguousPayload,

    /// Inline text does not start with `//`.
    #[error("BAD_REQUEST failed with RC = 8, Submit input data does not start with a slash")]
    NotJcl {
        /// Configured response status.
        status: StatusCode,
    },

    /// An inline line is longer than the record length.
    #[error("Invalid jcl line length {max}")]
    LineTooLong {
        /// One-based line number.
        line: usize,
        /// Record length.
        max: usize,
    },

    /// Inline text has more lines than the internal reader accepts.
    #[error("Submit input data has {count} records, more than the limit of {max}")]
    TooManyRecords {
        /// Lines in the text.
        count: usize,
        /// Reader capacity.
        max: usize,
    },

    /// The `file` value is not a valid dataset reference.
    #[error("Invalid dataset name")]
    InvalidDatasetName(#[source] NameError),

    /// Dynamic allocation failed.
    #[error("{}", translation.message)]
    Allocation {
        /// Classification of the failure.
        translation: Translation,
        /// Raw status triple.
        error: DynallocError,
    },

    /// The allocated dataset could not be opened.
    #[error("File could not be opened or does not exist")]
    DatasetUnavailable(#[source] DatasetError),

    /// The dataset has undefined-length records.
    #[error("Undefined-length dataset")]
    UndefinedRecordFormat,

    /// The internal reader could not be opened.
    #[error("Internal reader unavailable: {0}")]
    Sink(#[source] SinkError),

    /// The internal reader returned a blank job identifier.
    #[error("BAD_REQUEST failed with RC = 12, Submit input data does not start with a valid job line")]
    JobIdMissing,

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl SubmitError {
    /// Failure class.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidBody(_)
            | Self::MissingPayload
            | Self::AmbiguousPayload
            | Self::NotJcl { .. }
            | Self::LineTooLong { .. }
            | Self::TooManyRecords { .. }
            | Self::InvalidDatasetName(_)
            | Self::UndefinedRecordFormat => ErrorClass::Validation,
            Self::Allocation { translation, .. } => match translation.status {
                403 => ErrorClass::Contention,
                404 => ErrorClass::Availability,
                _ => ErrorClass::Allocation,
            },
            Self::DatasetUnavailable(_) => ErrorClass::Availability,
            Self::Sink(_) => ErrorClass::Stream,
            Self::JobIdMissing => ErrorClass::ResultMissing,
            Self::BodyUnreadable | Self::Conversion(_) | Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotJcl { status } => *status,
            Self::Allocation { translation, .. } => StatusCode::from_u16(translation.status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::InvalidBody(_)
            | Self::MissingPayload
            | Self::AmbiguousPayload
            | Self::LineTooLong { .. }
            | Self::TooManyRecords { .. }
            | Self::InvalidDatasetName(_)
            | Self::UndefinedRecordFormat => StatusCode::BAD_REQUEST,
            Self::DatasetUnavailable(_) => StatusCode::NOT_FOUND,
            Self::BodyUnreadable
            | Self::Conversion(_)
            | Self::Sink(_)
            | Self::JobIdMissing
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SubmitError> for ErrorResponse {
    fn from(err: SubmitError) -> Self {
        let response = ErrorResponse::from_status(err.status(), err.to_string());
        match &err {
            SubmitError::Allocation { error, .. } => response
                .with_reason(error.rc.code())
                .with_details(vec![
                    format!("rc={}", error.rc),
                    format!("sysRC={}", error.sys_rc),
                    format!("sysRSN=0x{:08X}", error.sys_rsn),
                ]),
            SubmitError::LineTooLong { line, .. } => {
                response.with_details(vec![format!("line={line}")])
            }
            SubmitError::InvalidDatasetName(source) => {
                response.with_details(vec![source.to_string()])
            }
            SubmitError::DatasetUnavailable(source) => {
                response.with_details(vec![source.to_string()])
            }
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostsvc_dynalloc::{reason, translate, DatasetName, MemberName, Site};

    fn allocation_error(rsn: u32) -> SubmitError {
        let dsn = DatasetName::new("IBMUSER.JCL").unwrap();
        let member = MemberName::new("PAYROLL").unwrap();
        let error = DynallocError::svc99(rsn);
        SubmitError::Allocation {
            translation: translate(&error, &dsn, Some(&member), Site::READ),
            error,
        }
    }

    #[test]
    fn allocation_classes() {
        let busy = allocation_error(reason::DATASET_IN_USE);
        assert_eq!(busy.class(), ErrorClass::Contention);
        assert_eq!(busy.status(), StatusCode::FORBIDDEN);

        let device = allocation_error(reason::DEVICE_UNAVAILABLE);
        assert_eq!(device.class(), ErrorClass::Availability);

        let other = allocation_error(reason::NOT_CATALOGED);
        assert_eq!(other.class(), ErrorClass::Allocation);
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn allocation_response_carries_triple() {
        let response = ErrorResponse::from(allocation_error(reason::DATASET_IN_USE));
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body.reason, 8);
        assert_eq!(
            response.body.details,
            ["rc=8", "sysRC=4", "sysRSN=0x020C0000"]
        );
        assert!(response.body.message.contains("busy (r)"));
    }

    #[test]
    fn non_jcl_status_is_configurable() {
        let err = SubmitError::NotJcl {
            status: StatusCode::BAD_REQUEST,
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.class(), ErrorClass::Validation);
        assert!(err.to_string().contains("does not start with a slash"));
    }

    #[test]
    fn line_too_long_message() {
        let err = SubmitError::LineTooLong { line: 3, max: 80 };
        let response = ErrorResponse::from(err);
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body.message, "Invalid jcl line length 80");
        assert_eq!(response.body.details, ["line=3"]);
    }

    #[test]
    fn too_many_records_is_validation() {
        let err = SubmitError::TooManyRecords { count: 3, max: 2 };
        assert_eq!(err.class(), ErrorClass::Validation);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("limit of 2"));
    }
}
