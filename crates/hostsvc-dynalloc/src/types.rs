//! Allocation request/handle types and dataset attributes.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::names::{DatasetName, DatasetPath, DdName, MemberName};

/// Access disposition (the first DISP sub-parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// `DISP=SHR`: other shared holders are allowed.
    Shared,
    /// `DISP=OLD`: single holder only.
    Exclusive,
}

/// Allocation option flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocFlags(u16);

impl AllocFlags {
    /// No options.
    pub const NONE: AllocFlags = AllocFlags(0);
    /// Do not convert the allocation to a permanently allocated one.
    pub const NO_CONVERSION: AllocFlags = AllocFlags(0x0001);
    /// Fail instead of waiting for a volume mount.
    pub const NO_MOUNT: AllocFlags = AllocFlags(0x0002);

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: AllocFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw flag bits.
    pub fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for AllocFlags {
    type Output = AllocFlags;

    fn bitor(self, rhs: AllocFlags) -> AllocFlags {
        AllocFlags(self.0 | rhs.0)
    }
}

/// A request to allocate a dataset (optionally a member) to a DD name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRequest {
    /// Dataset to allocate.
    pub dataset: DatasetName,
    /// Member within a partitioned dataset.
    pub member: Option<MemberName>,
    /// Requested access.
    pub disposition: Disposition,
    /// Allocation options.
    pub flags: AllocFlags,
}

impl AllocationRequest {
    /// Shared, no-conversion, no-mount read access to an existing dataset.
    pub fn shared_read(path: &DatasetPath) -> Self {
        Self {
            dataset: path.dataset.clone(),
            member: path.member.clone(),
            disposition: Disposition::Shared,
            flags: AllocFlags::NO_CONVERSION | AllocFlags::NO_MOUNT,
        }
    }
}

/// A live allocation. Not `Clone`: each handle is released exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct AllocationHandle {
    /// DD name bound to the dataset.
    pub ddname: DdName,
    /// Allocated dataset.
    pub dataset: DatasetName,
    /// Allocated member, if any.
    pub member: Option<MemberName>,
    /// Granted access.
    pub disposition: Disposition,
    /// Options the allocation was made with.
    pub flags: AllocFlags,
}

/// Record format (RECFM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordFormat {
    /// Fixed-length records.
    #[serde(rename = "F")]
    Fixed,
    /// Fixed-length, blocked.
    #[default]
    #[serde(rename = "FB")]
    FixedBlocked,
    /// Variable-length records.
    #[serde(rename = "V")]
    Variable,
    /// Variable-length, blocked.
    #[serde(rename = "VB")]
    VariableBlocked,
    /// Undefined-length records.
    #[serde(rename = "U")]
    Undefined,
}

/// Dataset attributes relevant to record streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetAttributes {
    /// Record format.
    pub recfm: RecordFormat,
    /// Logical record length (maximum for variable formats).
    pub lrecl: usize,
}

impl Default for DatasetAttributes {
    fn default() -> Self {
        Self {
            recfm: RecordFormat::FixedBlocked,
            lrecl: 80,
        }
    }
}
