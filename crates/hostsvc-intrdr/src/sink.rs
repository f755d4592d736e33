//! Submission sink: a one-shot, ordered channel of fixed-length records.

use crate::error::SinkError;
use crate::job::JobIdentifier;

/// Opens submission targets.
pub trait SubmissionSink: Send + Sync {
    /// Open a fresh target accepting records of exactly `lrecl` bytes.
    fn open(&self, lrecl: usize) -> Result<Box<dyn SubmissionTarget>, SinkError>;

    /// Most records one target accepts, if bounded.
    fn capacity(&self) -> Option<usize> {
        None
    }
}

/// A single-use output channel. Records are kept in write order.
pub trait SubmissionTarget: Send {
    /// Record length this target accepts.
    fn lrecl(&self) -> usize;

    /// Append one record.
    fn write_record(&mut self, record: &[u8]) -> Result<(), SinkError>;

    /// Finish the submission and read the completion token.
    ///
    /// Consumes the target; a blank token is [`SinkError::JobIdMissing`].
    fn close(self: Box<Self>) -> Result<JobIdentifier, SinkError>;
}
