//! Dynamic allocation error types.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Well-known SVC 99 reason codes (`S99ERROR << 16 | S99INFO`).
pub mod reason {
    /// Data set in use by another job, or requested exclusively by another.
    pub const DATASET_IN_USE: u32 = 0x020C_0000;
    /// Exclusive use requested for a data set already shared by others.
    pub const EXCLUSIVE_UNAVAILABLE: u32 = 0x0210_0000;
    /// Required volume or unit is not available.
    pub const DEVICE_UNAVAILABLE: u32 = 0x0218_0000;
    /// Catalog needed to locate the data set is not available.
    pub const CATALOG_UNAVAILABLE: u32 = 0x023C_0000;
    /// Data set is not cataloged.
    pub const NOT_CATALOGED: u32 = 0x1708_0000;
    /// DD name to unallocate was not found.
    pub const DDNAME_NOT_FOUND: u32 = 0x0438_0000;
}

/// Return code of the dynamic-allocation service itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynallocRc {
    /// Building the text-unit parameter list failed.
    TextUnitAllocFailed,
    /// SVC 99 ran and rejected the request; see the subsystem codes.
    Svc99Failed,
    /// Any other service return code.
    Other(i32),
}

impl DynallocRc {
    /// Numeric return code.
    pub fn code(self) -> i32 {
        match self {
            Self::TextUnitAllocFailed => 4,
            Self::Svc99Failed => 8,
            Self::Other(rc) => rc,
        }
    }
}

impl fmt::Display for DynallocRc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Status triple reported by a failed allocation or release.
///
/// Callers outside this crate treat the triple as opaque and hand it to
/// [`crate::translate::translate`] for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Diagnostic)]
#[error("DYNALLOC failed: rc={rc}, sysRC={sys_rc}, sysRSN={sys_rsn:#010X}")]
#[diagnostic(code(dynalloc::failed))]
pub struct DynallocError {
    /// Service return code.
    pub rc: DynallocRc,
    /// SVC 99 return code.
    pub sys_rc: i32,
    /// SVC 99 error and info reason, packed.
    pub sys_rsn: u32,
}

impl DynallocError {
    /// An SVC 99 rejection (`sysRC` 4) with the given reason.
    pub fn svc99(sys_rsn: u32) -> Self {
        Self {
            rc: DynallocRc::Svc99Failed,
            sys_rc: 4,
            sys_rsn,
        }
    }
}

/// Errors produced while validating dataset and member names.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum NameError {
    /// Dataset name violates the naming rules.
    #[error("invalid dataset name '{name}': {reason}")]
    #[diagnostic(code(dynalloc::invalid_dsname))]
    InvalidDsname { name: String, reason: String },

    /// Member name violates the naming rules.
    #[error("invalid member name '{name}': {reason}")]
    #[diagnostic(code(dynalloc::invalid_member))]
    InvalidMember { name: String, reason: String },

    /// The path is not of the form `NAME` or `NAME(MEMBER)`.
    #[error("invalid dataset path '{path}'")]
    #[diagnostic(code(dynalloc::invalid_path))]
    InvalidPath { path: String },
}

/// Errors produced when opening an allocated dataset.
#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    /// The DD name is not allocated.
    #[error("DD '{ddname}' is not allocated")]
    #[diagnostic(code(dynalloc::not_allocated))]
    NotAllocated { ddname: String },

    /// The dataset or member could not be opened.
    #[error("dataset '{name}' could not be opened: {source}")]
    #[diagnostic(code(dynalloc::open_failed))]
    OpenFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The dataset has undefined-length records and cannot be streamed.
    #[error("dataset '{name}' has undefined-length records")]
    #[diagnostic(code(dynalloc::recfm_u))]
    UndefinedRecordFormat { name: String },
}
