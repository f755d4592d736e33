//! Internal reader error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while formatting text into records.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum FormatError {
    /// A line is longer than the record length.
    #[error("line {line} is {length} bytes, longer than the record length {max}")]
    #[diagnostic(code(intrdr::line_too_long))]
    LineTooLong {
        /// One-based line number.
        line: usize,
        /// Length before padding.
        length: usize,
        /// Record length.
        max: usize,
    },
}

/// Errors produced by a submission sink or target.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SinkError {
    /// A record did not have the target's exact length.
    #[error("record is {actual} bytes, expected {expected}")]
    #[diagnostic(code(intrdr::record_length))]
    RecordLength { expected: usize, actual: usize },

    /// The target refused more records.
    #[error("submission exceeds {max} records")]
    #[diagnostic(code(intrdr::capacity))]
    Capacity { max: usize },

    /// The target was asked for an unusable record length.
    #[error("unsupported record length {lrecl}")]
    #[diagnostic(code(intrdr::bad_lrecl))]
    UnsupportedRecordLength { lrecl: usize },

    /// The completion token was blank: no job was created.
    #[error("no job identifier was returned")]
    #[diagnostic(
        code(intrdr::job_id_missing),
        help("the records must begin with a valid JOB statement")
    )]
    JobIdMissing,
}
