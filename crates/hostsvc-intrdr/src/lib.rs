//! # Internal reader
//!
//! Formats job-control text into fixed-length records and submits them to
//! the job input queue.
//!
//! - **Record formatting**: line-length validation and blank padding
//! - **Submission sink**: the one-shot `open → write_record → close` contract
//! - **Internal reader**: the in-process sink that queues jobs as `JOBnnnnn`
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hostsvc_encoding::CP1047;
//! use hostsvc_intrdr::{InternalReader, JobQueue, RecordFormatter, SubmissionSink};
//!
//! let reader = InternalReader::new(Arc::new(JobQueue::new()), &CP1047, 1000, tracing::Span::none());
//! let text = CP1047.encode("//JOB1 JOB\n//STEP1 EXEC PGM=IEFBR14").unwrap();
//!
//! let mut target = reader.open(80).unwrap();
//! for record in RecordFormatter::new(80, &CP1047).format_text(&text).unwrap() {
//!     target.write_record(&record).unwrap();
//! }
//! assert_eq!(target.close().unwrap().as_str(), "JOB00001");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod intrdr;
pub mod job;
pub mod queue;
pub mod record;
pub mod sink;

pub use error::{FormatError, SinkError};
pub use intrdr::{parse_job_card, InternalReader, JobCard};
pub use job::{JobId, JobIdentifier, SubmittedJob};
pub use queue::{JobQueue, DEFAULT_MAX_JOBS};
pub use record::{PaddedRecords, RecordFormatter, TextRecords};
pub use sink::{SubmissionSink, SubmissionTarget};
