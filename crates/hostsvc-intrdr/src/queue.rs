//! Input queue for jobs accepted by the internal reader.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use dashmap::DashMap;

use crate::job::{JobId, SubmittedJob};

/// Highest job number before wrapping back to 1.
const MAX_JOB_NUM: u32 = 99_999;

/// Jobs retained by [`JobQueue::new`].
pub const DEFAULT_MAX_JOBS: usize = 10_000;

/// Thread-safe job input queue. Job numbers are assigned in submission order.
///
/// The queue holds at most `max_jobs` jobs; queueing one more evicts the
/// oldest. A wrapped job number is never reissued while its job is queued.
#[derive(Debug)]
pub struct JobQueue {
    jobs: DashMap<u32, SubmittedJob>,
    numbering: Mutex<Numbering>,
    max_jobs: usize,
}

#[derive(Debug)]
struct Numbering {
    next: u32,
    order: VecDeque<u32>,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    /// Create an empty queue retaining [`DEFAULT_MAX_JOBS`] jobs.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_JOBS)
    }

    /// Create an empty queue retaining at most `max_jobs` jobs, clamped to
    /// `1..=99_999`.
    pub fn with_capacity(max_jobs: usize) -> Self {
        Self::starting_at(max_jobs, 1)
    }

    fn starting_at(max_jobs: usize, next: u32) -> Self {
        Self {
            jobs: DashMap::new(),
            numbering: Mutex::new(Numbering {
                next,
                order: VecDeque::new(),
            }),
            max_jobs: max_jobs.clamp(1, MAX_JOB_NUM as usize),
        }
    }

    /// Queue a job and return its number.
    pub fn submit(&self, name: &str, class: char, priority: u8, records: Vec<String>) -> JobId {
        let mut numbering = self
            .numbering
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while self.jobs.len() >= self.max_jobs {
            match numbering.order.pop_front() {
                Some(oldest) => {
                    self.jobs.remove(&oldest);
                }
                None => break,
            }
        }

        let id = JobId(self.next_free(&mut numbering));
        let job = SubmittedJob {
            id,
            name: name.to_string(),
            class,
            priority: priority.min(15),
            records,
            submitted_at: Utc::now(),
        };
        self.jobs.insert(id.0, job);
        numbering.order.push_back(id.0);
        id
    }

    /// Look up a queued job.
    pub fn get(&self, id: JobId) -> Option<SubmittedJob> {
        self.jobs.get(&id.0).map(|entry| entry.value().clone())
    }

    /// Queued jobs ordered by job number.
    pub fn list(&self) -> Vec<SubmittedJob> {
        let mut jobs: Vec<SubmittedJob> = self.jobs.iter().map(|e| e.value().clone()).collect();
        jobs.sort_by_key(|job| job.id.0);
        jobs
    }

    /// Number of queued jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Most jobs retained at once.
    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }

    /// Next job number not held by a queued job. Terminates because the
    /// queue always has a free slot when this runs.
    fn next_free(&self, numbering: &mut Numbering) -> u32 {
        loop {
            let num = numbering.next;
            numbering.next = if num >= MAX_JOB_NUM { 1 } else { num + 1 };
            if !self.jobs.contains_key(&num) {
                return num;
            }
        }
    }
}
