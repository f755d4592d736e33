//! Classification of allocation status triples into client-facing failures.

use std::fmt;

use crate::error::{reason, DynallocError, DynallocRc};
use crate::names::{DatasetName, MemberName};

/// Semantic class of an allocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocFailure {
    /// Another holder prevents the requested access.
    ResourceBusy,
    /// The device or volume is not available.
    DeviceUnavailable,
    /// The catalog needed to locate the dataset is not available.
    CatalogUnavailable,
    /// Anything else.
    AllocationFailed,
}

impl AllocFailure {
    /// HTTP status for this class.
    pub fn status(self) -> u16 {
        match self {
            Self::ResourceBusy => 403,
            Self::DeviceUnavailable | Self::CatalogUnavailable => 404,
            Self::AllocationFailed => 500,
        }
    }
}

/// One-letter tag naming the operation that allocated (`r` for read).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site(pub char);

impl Site {
    /// Read-oriented operations, including job submission from a dataset.
    pub const READ: Site = Site('r');
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of [`translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Failure class.
    pub kind: AllocFailure,
    /// HTTP status.
    pub status: u16,
    /// Human-readable message naming the dataset, member and site.
    pub message: String,
}

/// Classify a failed allocation.
///
/// Only SVC 99 rejections with `sysRC` 4 are broken out; the first matching
/// reason wins and everything else is a generic allocation failure.
pub fn translate(
    err: &DynallocError,
    dataset: &DatasetName,
    member: Option<&MemberName>,
    site: Site,
) -> Translation {
    let dsn = dataset.padded();
    let mem = MemberName::padded(member);

    let kind = if err.rc == DynallocRc::Svc99Failed && err.sys_rc == 4 {
        match err.sys_rsn {
            reason::DATASET_IN_USE | reason::EXCLUSIVE_UNAVAILABLE => AllocFailure::ResourceBusy,
            reason::DEVICE_UNAVAILABLE => AllocFailure::DeviceUnavailable,
            reason::CATALOG_UNAVAILABLE => AllocFailure::CatalogUnavailable,
            _ => AllocFailure::AllocationFailed,
        }
    } else {
        AllocFailure::AllocationFailed
    };

    let message = match kind {
        AllocFailure::ResourceBusy => format!("Dataset '{dsn}({mem})' busy ({site})"),
        AllocFailure::DeviceUnavailable => {
            format!("Device not available for dataset '{dsn}({mem})' ({site})")
        }
        AllocFailure::CatalogUnavailable => {
            format!("Catalog not available for dataset '{dsn}({mem})' ({site})")
        }
        AllocFailure::AllocationFailed => format!(
            "DYNALLOC failed with RC = {}, DYN RC = {}, RSN = 0x{:08X}, dsn='{dsn}({mem})', ({site})",
            err.rc, err.sys_rc, err.sys_rsn
        ),
    };

    Translation {
        kind,
        status: kind.status(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> (DatasetName, MemberName) {
        (
            DatasetName::new("IBMUSER.JCL").unwrap(),
            MemberName::new("PAYROLL").unwrap(),
        )
    }

    #[test]
    fn busy_reasons_map_to_403() {
        let (dsn, mem) = names();
        for rsn in [reason::DATASET_IN_USE, reason::EXCLUSIVE_UNAVAILABLE] {
            let t = translate(&DynallocError::svc99(rsn), &dsn, Some(&mem), Site::READ);
            assert_eq!(t.kind, AllocFailure::ResourceBusy);
            assert_eq!(t.status, 403);
            assert!(t.message.starts_with("Dataset 'IBMUSER.JCL "));
            assert!(t.message.contains("(PAYROLL ) busy (r)"));
        }
    }

    #[test]
    fn availability_reasons_map_to_404() {
        let (dsn, mem) = names();
        let t = translate(
            &DynallocError::svc99(reason::DEVICE_UNAVAILABLE),
            &dsn,
            Some(&mem),
            Site::READ,
        );
        assert_eq!((t.kind, t.status), (AllocFailure::DeviceUnavailable, 404));
        assert!(t.message.starts_with("Device not available"));

        let t = translate(
            &DynallocError::svc99(reason::CATALOG_UNAVAILABLE),
            &dsn,
            None,
            Site::READ,
        );
        assert_eq!((t.kind, t.status), (AllocFailure::CatalogUnavailable, 404));
        assert!(t.message.ends_with("(        )' (r)"));
    }

    #[test]
    fn everything_else_is_500_with_triple() {
        let (dsn, mem) = names();
        let t = translate(
            &DynallocError::svc99(reason::NOT_CATALOGED),
            &dsn,
            Some(&mem),
            Site::READ,
        );
        assert_eq!((t.kind, t.status), (AllocFailure::AllocationFailed, 500));
        assert!(t
            .message
            .starts_with("DYNALLOC failed with RC = 8, DYN RC = 4, RSN = 0x17080000, dsn='IBMUSER.JCL"));
    }

    #[test]
    fn busy_reason_needs_svc99_and_sysrc_4() {
        let (dsn, _) = names();
        let wrong_sys_rc = DynallocError {
            rc: DynallocRc::Svc99Failed,
            sys_rc: 8,
            sys_rsn: reason::DATASET_IN_USE,
        };
        assert_eq!(
            translate(&wrong_sys_rc, &dsn, None, Site::READ).kind,
            AllocFailure::AllocationFailed
        );
        let wrong_rc = DynallocError {
            rc: DynallocRc::TextUnitAllocFailed,
            sys_rc: 4,
            sys_rsn: reason::DATASET_IN_USE,
        };
        assert_eq!(translate(&wrong_rc, &dsn, None, Site::READ).status, 500);
    }
}
