//! Internal reader (INTRDR): collects JCL records and queues the job.

use std::sync::Arc;

use hostsvc_encoding::CodePage;
use tracing::{debug, info, Span};

use crate::error::SinkError;
use crate::job::{JobIdentifier, JOB_ID_LEN};
use crate::queue::JobQueue;
use crate::sink::{SubmissionSink, SubmissionTarget};

/// Largest record the reader accepts.
pub const MAX_LRECL: usize = 32_760;

/// The internal reader sink.
#[derive(Debug, Clone)]
pub struct InternalReader {
    queue: Arc<JobQueue>,
    code_page: &'static CodePage,
    max_records: usize,
    span: Span,
}

impl InternalReader {
    /// A reader queueing onto `queue`. Records arrive in `code_page`, and a
    /// submission may hold at most `max_records` records.
    pub fn new(
        queue: Arc<JobQueue>,
        code_page: &'static CodePage,
        max_records: usize,
        span: Span,
    ) -> Self {
        Self {
            queue,
            code_page,
            max_records,
            span,
        }
    }

    /// The queue jobs are placed on.
    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }
}

impl SubmissionSink for InternalReader {
    fn open(&self, lrecl: usize) -> Result<Box<dyn SubmissionTarget>, SinkError> {
        if lrecl == 0 || lrecl > MAX_LRECL {
            return Err(SinkError::UnsupportedRecordLength { lrecl });
        }
        debug!(parent: &self.span, lrecl, "internal reader opened");
        Ok(Box::new(ReaderTarget {
            reader: self.clone(),
            lrecl,
            records: Vec::new(),
        }))
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.max_records)
    }
}

struct ReaderTarget {
    reader: InternalReader,
    lrecl: usize,
    records: Vec<Vec<u8>>,
}

impl SubmissionTarget for ReaderTarget {
    fn lrecl(&self) -> usize {
        self.lrecl
    }

    fn write_record(&mut self, record: &[u8]) -> Result<(), SinkError> {
        if record.len() != self.lrecl {
            return Err(SinkError::RecordLength {
                expected: self.lrecl,
                actual: record.len(),
            });
        }
        if self.records.len() >= self.reader.max_records {
            return Err(SinkError::Capacity {
                max: self.reader.max_records,
            });
        }
        self.records.push(record.to_vec());
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<JobIdentifier, SinkError> {
        let reader = &self.reader;
        let lines: Vec<String> = self
            .records
            .iter()
            .map(|r| reader.code_page.decode(r).trim_end().to_string())
            .collect();

        let mut token = [b' '; JOB_ID_LEN];
        if let Some(card) = parse_job_card(&lines) {
            let id = reader.queue.submit(&card.name, card.class, card.priority, lines);
            token.copy_from_slice(id.to_string().as_bytes());
            info!(
                parent: &reader.span,
                job_id = %id,
                job_name = %card.name,
                class = %card.class,
                records = self.records.len(),
                "job queued"
            );
        } else {
            debug!(
                parent: &reader.span,
                records = self.records.len(),
                "no JOB statement; submission discarded"
            );
        }
        JobIdentifier::from_token(&token)
    }
}

/// Fields taken from a JOB statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard {
    /// Job name.
    pub name: String,
    /// `CLASS=`, default `A`.
    pub class: char,
    /// `PRTY=`, default 1.
    pub priority: u8,
}

/// Find the JOB statement.
///
/// It must be the first statement: only JCL comments (`//*`) and JECL
/// statements (`/*`) may precede it.
pub fn parse_job_card(lines: &[String]) -> Option<JobCard> {
    for line in lines {
        if line.starts_with("//*") || line.starts_with("/*") {
            continue;
        }
        let rest = line.strip_prefix("//")?;
        if rest.starts_with(' ') {
            return None;
        }
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if tokens.len() < 2 || !tokens[1].eq_ignore_ascii_case("JOB") {
            return None;
        }
        let name = tokens[0].to_ascii_uppercase();
        if name.len() > 8 {
            return None;
        }

        let mut card = JobCard {
            name,
            class: 'A',
            priority: 1,
        };
        if let Some(operands) = tokens.get(2) {
            for param in operands.split(',') {
                let param = param.trim().to_ascii_uppercase();
                if let Some(val) = param.strip_prefix("CLASS=") {
                    if let Some(c) = val.chars().next() {
                        card.class = c;
                    }
                } else if let Some(val) = param.strip_prefix("PRTY=") {
                    if let Ok(p) = val.parse::<u8>() {
                        card.priority = p;
                    }
                }
            }
        }
        return Some(card);
    }
    None
}
