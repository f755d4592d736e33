//! Cross-module flows: catalog → allocator → guard → dataset → translate.

use std::sync::Arc;
use std::thread;

use hostsvc_dynalloc::{
    reason, translate, AllocFailure, Allocation, AllocationRequest, Catalog, DatasetAccess,
    DatasetDefinition, DatasetPath, DdName, Disposition, HostAllocator, RecordFormat,
    ResourceAllocator, Site,
};
use hostsvc_encoding::CP1047;
use tracing::Span;

fn host() -> (tempfile::TempDir, Arc<HostAllocator>) {
    let dir = tempfile::tempdir().unwrap();
    let pds = dir.path().join("IBMUSER").join("JCL");
    std::fs::create_dir_all(&pds).unwrap();
    std::fs::write(
        pds.join("PAYROLL"),
        "//PAYROLL JOB (ACCT),'PAY',CLASS=A\n//STEP1 EXEC PGM=IEFBR14\n",
    )
    .unwrap();

    let defs = [DatasetDefinition {
        name: "IBMUSER.JCL".into(),
        recfm: RecordFormat::FixedBlocked,
        lrecl: 80,
        volume: Some("WORK01".into()),
        partitioned: true,
    }];
    let catalog = Catalog::with_definitions(dir.path(), &defs).unwrap();
    let alloc = HostAllocator::new(Arc::new(catalog), &CP1047, Span::none());
    (dir, Arc::new(alloc))
}

#[test]
fn read_member_through_scoped_allocation() {
    let (_dir, alloc) = host();
    let path = DatasetPath::parse("//'IBMUSER.JCL(PAYROLL)'").unwrap();
    let request = AllocationRequest::shared_read(&path);

    {
        let held = Allocation::acquire(alloc.as_ref(), &request, Span::none()).unwrap();
        let input = alloc.open(held.handle()).unwrap();
        assert_eq!(input.lrecl(), 80);
        let records: Vec<Vec<u8>> = input.collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][..2], &[0x61, 0x61]);
        assert_eq!(alloc.active_allocations(), 1);
    }
    assert_eq!(alloc.active_allocations(), 0);
}

#[test]
fn allocations_get_system_generated_ddnames() {
    let (_dir, alloc) = host();
    let path = DatasetPath::parse("IBMUSER.JCL(PAYROLL)").unwrap();
    let first = alloc.allocate(&AllocationRequest::shared_read(&path)).unwrap();
    let second = alloc.allocate(&AllocationRequest::shared_read(&path)).unwrap();
    assert_eq!(first.ddname, DdName::generated(1));
    assert_eq!(second.ddname, DdName::generated(2));
    alloc.release(&first).unwrap();
    alloc.release(&second).unwrap();
}

#[test]
fn contention_translates_to_busy() {
    let (_dir, alloc) = host();
    let path = DatasetPath::parse("IBMUSER.JCL(PAYROLL)").unwrap();
    let exclusive = AllocationRequest {
        disposition: Disposition::Exclusive,
        ..AllocationRequest::shared_read(&path)
    };
    let holder = alloc.allocate(&exclusive).unwrap();

    let err = alloc
        .allocate(&AllocationRequest::shared_read(&path))
        .unwrap_err();
    let t = translate(&err, &path.dataset, path.member.as_ref(), Site::READ);
    assert_eq!(t.kind, AllocFailure::ResourceBusy);
    assert_eq!(t.status, 403);
    assert!(t.message.contains("PAYROLL"));
    assert!(t.message.ends_with("(r)"));

    alloc.release(&holder).unwrap();
}

#[test]
fn concurrent_shared_readers() {
    let (_dir, alloc) = host();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let alloc = Arc::clone(&alloc);
            thread::spawn(move || {
                let path = DatasetPath::parse("IBMUSER.JCL(PAYROLL)").unwrap();
                let held = Allocation::acquire(
                    alloc.as_ref(),
                    &AllocationRequest::shared_read(&path),
                    Span::none(),
                )
                .unwrap();
                alloc.open(held.handle()).unwrap().count()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 2);
    }
    assert_eq!(alloc.active_allocations(), 0);
}

#[test]
fn offline_volume_translates_to_device_unavailable() {
    let (_dir, alloc) = host();
    alloc.set_volume_online("WORK01", false);
    let path = DatasetPath::parse("IBMUSER.JCL(PAYROLL)").unwrap();
    let err = alloc
        .allocate(&AllocationRequest::shared_read(&path))
        .unwrap_err();
    assert_eq!(err.sys_rsn, reason::DEVICE_UNAVAILABLE);
    let t = translate(&err, &path.dataset, path.member.as_ref(), Site::READ);
    assert_eq!(t.status, 404);
}
