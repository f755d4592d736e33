//! Pipeline contract tests: `/jes` driven against recording allocator and
//! sink fakes, checking exactly which collaborator calls each request makes.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use hostsvc_dynalloc::{
    reason, AllocationHandle, AllocationRequest, DatasetAccess, DatasetAttributes, DatasetError,
    DatasetInput, DdName, DynallocError, RecordFormat, ResourceAllocator,
};
use hostsvc_encoding::HostCharset;
use hostsvc_intrdr::{JobIdentifier, SinkError, SubmissionSink, SubmissionTarget};
use hostsvc_rest::config::ServiceConfig;
use hostsvc_rest::handlers::build_router;
use hostsvc_rest::state::AppState;
use hostsvc_rest::submit::Backends;

// ─── Recording allocator ───

#[derive(Default)]
struct RecordingAllocator {
    allocs: AtomicUsize,
    releases: AtomicUsize,
    opens: AtomicUsize,
    fail_allocate: Option<DynallocError>,
    fail_release: bool,
    fail_open: bool,
    /// `None` entries become read errors.
    records: Vec<Option<String>>,
}

impl ResourceAllocator for RecordingAllocator {
    fn allocate(&self, request: &AllocationRequest) -> Result<AllocationHandle, DynallocError> {
        self.allocs.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_allocate {
            return Err(err);
        }
        Ok(AllocationHandle {
            ddname: DdName::generated(self.allocs.load(Ordering::SeqCst) as u32),
            dataset: request.dataset.clone(),
            member: request.member.clone(),
            disposition: request.disposition,
            flags: request.flags,
        })
    }

    fn release(&self, _handle: &AllocationHandle) -> Result<(), DynallocError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(DynallocError::svc99(reason::DDNAME_NOT_FOUND));
        }
        Ok(())
    }
}

impl DatasetAccess for RecordingAllocator {
    fn open(&self, handle: &AllocationHandle) -> Result<DatasetInput, DatasetError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(DatasetError::OpenFailed {
                name: handle.dataset.to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        let records: Vec<io::Result<Vec<u8>>> = self
            .records
            .iter()
            .map(|r| match r {
                Some(text) => Ok(hostsvc_encoding::CP1047.encode(text).unwrap()),
                None => Err(io::Error::new(io::ErrorKind::Other, "I/O error on read")),
            })
            .collect();
        Ok(DatasetInput::new(
            DatasetAttributes {
                recfm: RecordFormat::FixedBlocked,
                lrecl: 80,
            },
            Box::new(records.into_iter()),
        ))
    }
}

// ─── Recording sink ───

#[derive(Default)]
struct SinkLog {
    opens: AtomicUsize,
    closes: AtomicUsize,
    records: Mutex<Vec<Vec<u8>>>,
}

struct RecordingSink {
    log: Arc<SinkLog>,
    token: [u8; 8],
    capacity: Option<usize>,
}

impl RecordingSink {
    fn new(token: &[u8; 8]) -> Self {
        Self {
            log: Arc::new(SinkLog::default()),
            token: *token,
            capacity: None,
        }
    }
}

struct RecordingTarget {
    log: Arc<SinkLog>,
    lrecl: usize,
    token: [u8; 8],
}

impl SubmissionSink for RecordingSink {
    fn open(&self, lrecl: usize) -> Result<Box<dyn SubmissionTarget>, SinkError> {
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingTarget {
            log: Arc::clone(&self.log),
            lrecl,
            token: self.token,
        }))
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl SubmissionTarget for RecordingTarget {
    fn lrecl(&self) -> usize {
        self.lrecl
    }

    fn write_record(&mut self, record: &[u8]) -> Result<(), SinkError> {
        self.log.records.lock().unwrap().push(record.to_vec());
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<JobIdentifier, SinkError> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        JobIdentifier::from_token(&self.token)
    }
}

// ─── Harness ───

struct Harness {
    allocator: Arc<RecordingAllocator>,
    sink: Arc<SinkLog>,
    app: axum::Router,
}

impl Harness {
    fn new(allocator: RecordingAllocator, token: &[u8; 8]) -> Self {
        Self::with_sink(allocator, RecordingSink::new(token))
    }

    fn with_sink(allocator: RecordingAllocator, sink: RecordingSink) -> Self {
        let allocator = Arc::new(allocator);
        let log = Arc::clone(&sink.log);
        let backends = Backends {
            allocator: allocator.clone(),
            datasets: allocator.clone(),
            sink: Arc::new(sink),
            charset: Arc::new(HostCharset),
        };
        let state = AppState::with_backends(ServiceConfig::default(), backends).unwrap();
        Self {
            allocator,
            sink: log,
            app: build_router(Arc::new(state)),
        }
    }

    fn default_ok() -> Self {
        Self::new(RecordingAllocator::default(), b"JOB00042")
    }

    async fn put(&self, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/jes")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn allocs(&self) -> usize {
        self.allocator.allocs.load(Ordering::SeqCst)
    }

    fn releases(&self) -> usize {
        self.allocator.releases.load(Ordering::SeqCst)
    }

    fn sink_opens(&self) -> usize {
        self.sink.opens.load(Ordering::SeqCst)
    }

    fn sink_closes(&self) -> usize {
        self.sink.closes.load(Ordering::SeqCst)
    }

    fn written(&self) -> Vec<Vec<u8>> {
        self.sink.records.lock().unwrap().clone()
    }

    fn assert_untouched(&self) {
        assert_eq!(self.allocs(), 0);
        assert_eq!(self.releases(), 0);
        assert_eq!(self.sink_opens(), 0);
        assert!(self.written().is_empty());
    }
}

fn decode(record: &[u8]) -> String {
    hostsvc_encoding::CP1047.decode(record)
}

// ─── Inline text ───

#[tokio::test]
async fn inline_lines_become_padded_records() {
    let h = Harness::default_ok();
    let (status, json) = h
        .put(serde_json::json!({"jcl": "//JOB1 JOB\n//STEP1 EXEC PGM=IEFBR14\n//DD1 DD DUMMY"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["jobId"], "JOB00042");

    let records = h.written();
    assert_eq!(records.len(), 3);
    for r in &records {
        assert_eq!(r.len(), 80);
    }
    assert_eq!(decode(&records[1]).trim_end(), "//STEP1 EXEC PGM=IEFBR14");
    assert!(records[2][14..].iter().all(|&b| b == 0x40));
    assert_eq!(h.allocs(), 0);
    assert_eq!((h.sink_opens(), h.sink_closes()), (1, 1));
}

#[tokio::test]
async fn empty_line_still_produces_a_record() {
    let h = Harness::default_ok();
    let (status, _) = h
        .put(serde_json::json!({"jcl": "//JOB1 JOB\n\n//STEP1 EXEC PGM=IEFBR14"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let records = h.written();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1], vec![0x40; 80]);
}

#[tokio::test]
async fn overlong_line_touches_nothing() {
    let h = Harness::default_ok();
    let jcl = format!("//JOB1 JOB\n//{}", "X".repeat(79));
    let (status, _) = h.put(serde_json::json!({ "jcl": jcl })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    h.assert_untouched();
}

#[tokio::test]
async fn inline_text_over_sink_capacity_touches_nothing() {
    let sink = RecordingSink {
        capacity: Some(2),
        ..RecordingSink::new(b"JOB00042")
    };
    let h = Harness::with_sink(RecordingAllocator::default(), sink);
    let (status, _) = h
        .put(serde_json::json!({"jcl": "//J JOB\n//S1 EXEC PGM=A\n//S2 EXEC PGM=B"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    h.assert_untouched();
}

#[tokio::test]
async fn missing_payload_touches_nothing() {
    let h = Harness::default_ok();
    let (status, _) = h.put(serde_json::json!({"force": true})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    h.assert_untouched();
}

#[tokio::test]
async fn non_jcl_text_touches_nothing() {
    let h = Harness::default_ok();
    let (status, _) = h.put(serde_json::json!({"jcl": "not-jcl"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    h.assert_untouched();
}

#[tokio::test]
async fn blank_job_id_is_500() {
    let h = Harness::new(RecordingAllocator::default(), b"        ");
    let (status, json) = h.put(serde_json::json!({"jcl": "//JOB1 JOB"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["message"].as_str().unwrap().contains("valid job line"));
    assert_eq!(h.sink_closes(), 1);
}

// ─── Dataset reference ───

fn dataset_allocator(records: &[Option<&str>]) -> RecordingAllocator {
    RecordingAllocator {
        records: records.iter().map(|r| r.map(str::to_string)).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn dataset_allocates_and_releases_once() {
    let h = Harness::new(
        dataset_allocator(&[Some("//PAY JOB"), Some(""), Some("//S1 EXEC PGM=X")]),
        b"JOB00007",
    );
    let (status, json) = h.put(serde_json::json!({"file": "IBMUSER.JCL(PAYROLL)"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["jobId"], "JOB00007");
    assert_eq!((h.allocs(), h.releases()), (1, 1));
    let records = h.written();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.len() == 80));
}

#[tokio::test]
async fn mid_stream_read_error_still_closes_and_releases() {
    let h = Harness::new(
        dataset_allocator(&[Some("//PAY JOB"), None, Some("//S1 EXEC PGM=X")]),
        b"JOB00008",
    );
    let (status, json) = h.put(serde_json::json!({"file": "IBMUSER.JCL(PAYROLL)"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["jobId"], "JOB00008");
    assert_eq!(h.written().len(), 1);
    assert_eq!(h.sink_closes(), 1);
    assert_eq!((h.allocs(), h.releases()), (1, 1));
}

#[tokio::test]
async fn busy_allocation_is_403_without_release() {
    let h = Harness::new(
        RecordingAllocator {
            fail_allocate: Some(DynallocError::svc99(reason::DATASET_IN_USE)),
            ..Default::default()
        },
        b"JOB00001",
    );
    let (status, json) = h.put(serde_json::json!({"file": "IBMUSER.JCL(PAYROLL)"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let msg = json["message"].as_str().unwrap();
    assert!(msg.contains("IBMUSER.JCL"));
    assert!(msg.contains("(PAYROLL )"));
    assert!(msg.contains("(r)"));
    assert_eq!((h.allocs(), h.releases()), (1, 0));
    assert_eq!(h.sink_opens(), 0);
}

#[tokio::test]
async fn open_failure_is_404_and_released() {
    let h = Harness::new(
        RecordingAllocator {
            fail_open: true,
            ..Default::default()
        },
        b"JOB00001",
    );
    let (status, _) = h.put(serde_json::json!({"file": "IBMUSER.CNTL"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!((h.allocs(), h.releases()), (1, 1));
    assert_eq!(h.sink_opens(), 0);
}

#[tokio::test]
async fn release_failure_does_not_change_the_response() {
    let h = Harness::new(
        RecordingAllocator {
            fail_release: true,
            records: vec![Some("//PAY JOB".to_string())],
            ..Default::default()
        },
        b"JOB00009",
    );
    let (status, json) = h.put(serde_json::json!({"file": "IBMUSER.JCL(PAYROLL)"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["jobId"], "JOB00009");
    assert_eq!(h.releases(), 1);
}

#[tokio::test]
async fn blank_job_id_from_dataset_is_500_and_released() {
    let h = Harness::new(dataset_allocator(&[Some("//S1 EXEC PGM=X")]), b"\0\0\0\0\0\0\0\0");
    let (status, _) = h.put(serde_json::json!({"file": "IBMUSER.JCL(NOJOB)"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!((h.allocs(), h.releases()), (1, 1));
    assert_eq!(h.sink_closes(), 1);
}
