//! Resource allocator: the DYNALLOC service boundary.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use hostsvc_encoding::CodePage;
use tracing::{debug, warn, Span};

use crate::catalog::Catalog;
use crate::dataset::{self, DatasetAccess, DatasetInput};
use crate::dd_table::DdTable;
use crate::error::{reason, DatasetError, DynallocError};
use crate::types::{AllocFlags, AllocationHandle, AllocationRequest};

/// Acquires and releases DD bindings to datasets.
pub trait ResourceAllocator: Send + Sync {
    /// Allocate the requested dataset to a new DD name.
    fn allocate(&self, request: &AllocationRequest) -> Result<AllocationHandle, DynallocError>;

    /// Free an allocation.
    fn release(&self, handle: &AllocationHandle) -> Result<(), DynallocError>;
}

/// Allocator over the service's dataset catalog.
#[derive(Debug)]
pub struct HostAllocator {
    catalog: Arc<Catalog>,
    dd_table: Mutex<DdTable>,
    offline_volumes: RwLock<HashSet<String>>,
    code_page: &'static CodePage,
    span: Span,
}

impl HostAllocator {
    /// Create an allocator. Dataset records are served in `code_page`.
    pub fn new(catalog: Arc<Catalog>, code_page: &'static CodePage, span: Span) -> Self {
        Self {
            catalog,
            dd_table: Mutex::new(DdTable::new()),
            offline_volumes: RwLock::new(HashSet::new()),
            code_page,
            span,
        }
    }

    /// The catalog this allocator resolves names against.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Vary a volume offline (`false`) or online (`true`).
    pub fn set_volume_online(&self, volume: &str, online: bool) {
        let volume = volume.to_ascii_uppercase();
        let mut offline = self
            .offline_volumes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if online {
            offline.remove(&volume);
        } else {
            offline.insert(volume);
        }
    }

    /// Number of DDs currently allocated.
    pub fn active_allocations(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, DdTable> {
        self.dd_table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_offline(&self, volume: &str) -> bool {
        self.offline_volumes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(volume)
    }

    fn reject(&self, request: &AllocationRequest, rsn: u32) -> DynallocError {
        let err = DynallocError::svc99(rsn);
        warn!(
            parent: &self.span,
            dsn = %request.dataset,
            rc = err.rc.code(),
            sys_rc = err.sys_rc,
            sys_rsn = %format_args!("0x{:08X}", err.sys_rsn),
            "allocation rejected"
        );
        err
    }
}

impl ResourceAllocator for HostAllocator {
    fn allocate(&self, request: &AllocationRequest) -> Result<AllocationHandle, DynallocError> {
        if !self.catalog.is_available() {
            return Err(self.reject(request, reason::CATALOG_UNAVAILABLE));
        }
        let entry = self
            .catalog
            .locate(&request.dataset)
            .ok_or_else(|| self.reject(request, reason::NOT_CATALOGED))?;

        if let Some(volume) = &entry.volume {
            if request.flags.contains(AllocFlags::NO_MOUNT) && self.is_offline(volume) {
                return Err(self.reject(request, reason::DEVICE_UNAVAILABLE));
            }
        }

        let ddname = self
            .table()
            .allocate(&request.dataset, request.member.as_ref(), request.disposition)
            .map_err(|err| self.reject(request, err.sys_rsn))?;

        debug!(
            parent: &self.span,
            ddname = %ddname,
            dsn = %request.dataset,
            member = ?request.member.as_ref().map(|m| m.as_str()),
            disposition = ?request.disposition,
            "allocated"
        );
        Ok(AllocationHandle {
            ddname,
            dataset: request.dataset.clone(),
            member: request.member.clone(),
            disposition: request.disposition,
            flags: request.flags,
        })
    }

    fn release(&self, handle: &AllocationHandle) -> Result<(), DynallocError> {
        self.table().unallocate(&handle.ddname)?;
        debug!(parent: &self.span, ddname = %handle.ddname, "unallocated");
        Ok(())
    }
}

impl DatasetAccess for HostAllocator {
    fn open(&self, handle: &AllocationHandle) -> Result<DatasetInput, DatasetError> {
        let entry = self
            .table()
            .lookup(&handle.ddname)
            .cloned()
            .ok_or_else(|| DatasetError::NotAllocated {
                ddname: handle.ddname.as_str().to_string(),
            })?;

        let not_found = || DatasetError::OpenFailed {
            name: entry.dataset.to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let cataloged = self.catalog.locate(&entry.dataset).ok_or_else(not_found)?;
        if entry.member.is_some() && !cataloged.partitioned {
            return Err(not_found());
        }

        let path = cataloged.member_path(entry.member.as_ref());
        dataset::open_text(
            &entry.dataset.to_string(),
            &path,
            cataloged.attributes,
            self.code_page,
        )
    }
}
