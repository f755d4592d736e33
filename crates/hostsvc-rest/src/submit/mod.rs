//! Submission orchestrator: request → records → internal reader → job id.
//!
//! Runs synchronously on the calling thread; every collaborator call blocks.
//! The HTTP layer hands the work to a blocking task.

pub mod error;
pub mod request;

use std::sync::Arc;

use axum::http::StatusCode;
use hostsvc_dynalloc::{
    translate, Allocation, AllocationRequest, DatasetAccess, DatasetError, DatasetPath,
    ResourceAllocator, Site,
};
use hostsvc_encoding::{Ccsid, Charset, CodePage};
use hostsvc_intrdr::{
    FormatError, JobIdentifier, RecordFormatter, SinkError, SubmissionSink, SubmissionTarget,
};
use tracing::{debug, info, warn, Span};

use crate::config::{ConfigError, SubmitConfig};
pub use error::{ErrorClass, SubmitError};
pub use request::{SubmissionKind, SubmissionRequest};

/// Marker every job-control text starts with.
const JCL_MARKER: &str = "//";

/// Pipeline stage, logged as the submission advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    /// Converting and parsing the body.
    Decoding,
    /// Checking the dataset reference.
    Validating,
    /// Allocating the dataset.
    Allocating,
    /// Writing records to the internal reader.
    Streaming,
    /// Closing the reader and reading the job id.
    ExtractingResult,
    /// Freeing the dataset.
    Releasing,
    /// Handing the outcome back.
    Responding,
}

/// Settings resolved from [`SubmitConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SubmitSettings {
    /// Record length for inline text.
    pub jcl_record_length: usize,
    /// Native CCSID.
    pub native: Ccsid,
    /// Native code page.
    pub code_page: &'static CodePage,
    /// Status for inline text without the `//` marker.
    pub non_jcl_status: StatusCode,
}

impl SubmitSettings {
    /// Resolve settings, validating the code page and status.
    pub fn from_config(config: &SubmitConfig) -> Result<Self, ConfigError> {
        let (native, code_page) = config.code_page()?;
        let non_jcl_status = StatusCode::from_u16(config.non_jcl_status)
            .map_err(|e| ConfigError::Invalid(format!("submit.non_jcl_status: {e}")))?;
        Ok(Self {
            jcl_record_length: config.jcl_record_length,
            native,
            code_page,
            non_jcl_status,
        })
    }
}

/// The collaborators a submission runs against.
#[derive(Clone)]
pub struct Backends {
    /// Dataset allocation.
    pub allocator: Arc<dyn ResourceAllocator>,
    /// Dataset reads through an allocated DD.
    pub datasets: Arc<dyn DatasetAccess>,
    /// Internal reader.
    pub sink: Arc<dyn SubmissionSink>,
    /// Charset conversion.
    pub charset: Arc<dyn Charset>,
}

/// Drives one submission from body to job identifier.
pub struct SubmissionOrchestrator {
    backends: Backends,
    settings: SubmitSettings,
    span: Span,
}

impl SubmissionOrchestrator {
    /// Create an orchestrator logging under `span`.
    pub fn new(backends: Backends, settings: SubmitSettings, span: Span) -> Self {
        Self {
            backends,
            settings,
            span,
        }
    }

    /// Decode and submit.
    pub fn handle(
        &self,
        body: &[u8],
        charset: Ccsid,
        force: bool,
    ) -> Result<JobIdentifier, SubmitError> {
        self.enter(SubmitState::Decoding);
        let request =
            SubmissionRequest::decode(self.backends.charset.as_ref(), body, charset, force)?;
        if request.force {
            debug!(parent: &self.span, "force flag set");
        }
        let result = self.submit(&request);
        self.enter(SubmitState::Responding);
        if let Ok(job_id) = &result {
            info!(parent: &self.span, job_id = %job_id, "submission accepted");
        }
        result
    }

    /// Submit a decoded request.
    pub fn submit(&self, request: &SubmissionRequest) -> Result<JobIdentifier, SubmitError> {
        match &request.kind {
            SubmissionKind::InlineText(text) => self.submit_text(text),
            SubmissionKind::DatasetReference(file) => self.submit_dataset(file),
        }
    }

    fn submit_text(&self, text: &str) -> Result<JobIdentifier, SubmitError> {
        if !text.starts_with(JCL_MARKER) {
            return Err(SubmitError::NotJcl {
                status: self.settings.non_jcl_status,
            });
        }
        let native =
            self.backends
                .charset
                .convert(text.as_bytes(), Ccsid::UTF_8, self.settings.native)?;

        let lrecl = self.settings.jcl_record_length;
        let records = RecordFormatter::new(lrecl, self.settings.code_page)
            .format_text(&native)
            .map_err(|FormatError::LineTooLong { line, max, .. }| SubmitError::LineTooLong {
                line,
                max,
            })?;
        let count = records.remaining();
        if let Some(max) = self.backends.sink.capacity() {
            if count > max {
                return Err(SubmitError::TooManyRecords { count, max });
            }
        }
        debug!(parent: &self.span, lines = count, lrecl, "inline text formatted");

        self.enter(SubmitState::Streaming);
        let mut target = self.backends.sink.open(lrecl).map_err(SubmitError::Sink)?;
        self.stream(target.as_mut(), records.map(Ok));
        self.close(target)
    }

    fn submit_dataset(&self, file: &str) -> Result<JobIdentifier, SubmitError> {
        self.enter(SubmitState::Validating);
        let path = DatasetPath::parse(file).map_err(SubmitError::InvalidDatasetName)?;

        self.enter(SubmitState::Allocating);
        let request = AllocationRequest::shared_read(&path);
        let allocation =
            Allocation::acquire(self.backends.allocator.as_ref(), &request, self.span.clone())
                .map_err(|error| SubmitError::Allocation {
                    translation: translate(&error, &path.dataset, path.member.as_ref(), Site::READ),
                    error,
                })?;

        let result = self.stream_dataset(&allocation);

        self.enter(SubmitState::Releasing);
        if let Err(err) = allocation.release() {
            warn!(
                parent: &self.span,
                dsn = %path,
                rc = err.rc.code(),
                sys_rc = err.sys_rc,
                sys_rsn = %format_args!("0x{:08X}", err.sys_rsn),
                "dataset release failed"
            );
        }
        result
    }

    fn stream_dataset(&self, allocation: &Allocation<'_>) -> Result<JobIdentifier, SubmitError> {
        let input = self
            .backends
            .datasets
            .open(allocation.handle())
            .map_err(|err| match err {
                DatasetError::UndefinedRecordFormat { .. } => SubmitError::UndefinedRecordFormat,
                other => SubmitError::DatasetUnavailable(other),
            })?;
        let lrecl = input.lrecl();
        debug!(
            parent: &self.span,
            ddname = %allocation.handle().ddname,
            lrecl,
            recfm = ?input.attributes.recfm,
            "dataset opened"
        );

        self.enter(SubmitState::Streaming);
        let mut target = self.backends.sink.open(lrecl).map_err(SubmitError::Sink)?;
        let records = RecordFormatter::new(lrecl, self.settings.code_page).format_stream(input);
        self.stream(target.as_mut(), records);
        self.close(target)
    }

    /// Write records in order. The first read or write failure stops the
    /// stream; the caller still closes the target.
    fn stream<I>(&self, target: &mut dyn SubmissionTarget, records: I) -> usize
    where
        I: Iterator<Item = std::io::Result<Vec<u8>>>,
    {
        let mut written = 0;
        for record in records {
            let outcome = record
                .map_err(|e| e.to_string())
                .and_then(|r| target.write_record(&r).map_err(|e: SinkError| e.to_string()));
            if let Err(reason) = outcome {
                warn!(parent: &self.span, written, error = %reason, "stream stopped early");
                break;
            }
            written += 1;
        }
        debug!(parent: &self.span, written, "records written");
        written
    }

    fn close(&self, target: Box<dyn SubmissionTarget>) -> Result<JobIdentifier, SubmitError> {
        self.enter(SubmitState::ExtractingResult);
        target.close().map_err(|err| match err {
            SinkError::JobIdMissing => SubmitError::JobIdMissing,
            other => SubmitError::Sink(other),
        })
    }

    fn enter(&self, state: SubmitState) {
        debug!(parent: &self.span, state = ?state, "submission state");
    }
}
