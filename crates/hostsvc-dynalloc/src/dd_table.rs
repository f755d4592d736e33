//! DD table: DD-name-to-dataset bindings plus SYSDSN-style serialization.

use std::collections::HashMap;

use crate::error::{reason, DynallocError};
use crate::names::{DatasetName, DdName, MemberName};
use crate::types::Disposition;

/// One live DD binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdEntry {
    /// The bound DD name.
    pub ddname: DdName,
    /// Dataset the DD refers to.
    pub dataset: DatasetName,
    /// Member, for a partitioned dataset.
    pub member: Option<MemberName>,
    /// Disposition the binding holds the dataset with.
    pub disposition: Disposition,
}

/// DD table for the service's address space.
///
/// Holders of a dataset are tracked per dataset name, so two DDs against
/// different members of one PDS still contend on the dataset.
#[derive(Debug)]
pub struct DdTable {
    entries: HashMap<DdName, DdEntry>,
    holders: HashMap<DatasetName, Vec<(DdName, Disposition)>>,
    next_dd_num: u32,
}

impl Default for DdTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DdTable {
    /// Create an empty DD table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            holders: HashMap::new(),
            next_dd_num: 1,
        }
    }

    /// Bind a system-generated DD name to `dataset`.
    ///
    /// Fails with `0x020C0000` when another DD holds the dataset exclusively
    /// (or a shared request meets an exclusive holder), and with `0x02100000`
    /// when exclusive use is requested while shared holders exist.
    pub fn allocate(
        &mut self,
        dataset: &DatasetName,
        member: Option<&MemberName>,
        disposition: Disposition,
    ) -> Result<DdName, DynallocError> {
        if let Some(holders) = self.holders.get(dataset) {
            if let Some(rsn) = conflict(holders, disposition) {
                return Err(DynallocError::svc99(rsn));
            }
        }

        let ddname = self.generate_ddname();
        self.entries.insert(
            ddname.clone(),
            DdEntry {
                ddname: ddname.clone(),
                dataset: dataset.clone(),
                member: member.cloned(),
                disposition,
            },
        );
        self.holders
            .entry(dataset.clone())
            .or_default()
            .push((ddname.clone(), disposition));
        Ok(ddname)
    }

    /// Free a DD name and drop its hold on the dataset.
    pub fn unallocate(&mut self, ddname: &DdName) -> Result<DdEntry, DynallocError> {
        let entry = self
            .entries
            .remove(ddname)
            .ok_or_else(|| DynallocError::svc99(reason::DDNAME_NOT_FOUND))?;

        if let Some(holders) = self.holders.get_mut(&entry.dataset) {
            holders.retain(|(dd, _)| dd != ddname);
            if holders.is_empty() {
                self.holders.remove(&entry.dataset);
            }
        }
        Ok(entry)
    }

    /// Look up a DD entry.
    pub fn lookup(&self, ddname: &DdName) -> Option<&DdEntry> {
        self.entries.get(ddname)
    }

    /// Number of live DD entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no DDs are allocated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next `SYSnnnnn` name not currently in use.
    fn generate_ddname(&mut self) -> DdName {
        loop {
            let name = DdName::generated(self.next_dd_num);
            self.next_dd_num = if self.next_dd_num >= 99_999 {
                1
            } else {
                self.next_dd_num + 1
            };
            if !self.entries.contains_key(&name) {
                return name;
            }
        }
    }
}

fn conflict(holders: &[(DdName, Disposition)], wanted: Disposition) -> Option<u32> {
    if holders.is_empty() {
        return None;
    }
    let held_exclusive = holders
        .iter()
        .any(|(_, disp)| *disp == Disposition::Exclusive);
    match (wanted, held_exclusive) {
        (_, true) => Some(reason::DATASET_IN_USE),
        (Disposition::Exclusive, false) => Some(reason::EXCLUSIVE_UNAVAILABLE),
        (Disposition::Shared, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dsn(name: &str) -> DatasetName {
        DatasetName::new(name).unwrap()
    }

    #[test]
    fn generates_sequential_ddnames() {
        let mut table = DdTable::new();
        let a = table.allocate(&dsn("A.B"), None, Disposition::Shared).unwrap();
        let b = table.allocate(&dsn("C.D"), None, Disposition::Shared).unwrap();
        assert_eq!(a.as_str(), "SYS00001");
        assert_eq!(b.as_str(), "SYS00002");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn shared_holders_coexist() {
        let mut table = DdTable::new();
        let ds = dsn("IBMUSER.JCL");
        let m = MemberName::new("PAYROLL").unwrap();
        table.allocate(&ds, Some(&m), Disposition::Shared).unwrap();
        table.allocate(&ds, None, Disposition::Shared).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn exclusive_holder_blocks_everyone() {
        let mut table = DdTable::new();
        let ds = dsn("IBMUSER.JCL");
        table.allocate(&ds, None, Disposition::Exclusive).unwrap();

        let err = table.allocate(&ds, None, Disposition::Shared).unwrap_err();
        assert_eq!(err, DynallocError::svc99(reason::DATASET_IN_USE));
        let err = table.allocate(&ds, None, Disposition::Exclusive).unwrap_err();
        assert_eq!(err.sys_rsn, reason::DATASET_IN_USE);
    }

    #[test]
    fn exclusive_request_against_shared_holder() {
        let mut table = DdTable::new();
        let ds = dsn("IBMUSER.JCL");
        table.allocate(&ds, None, Disposition::Shared).unwrap();
        let err = table.allocate(&ds, None, Disposition::Exclusive).unwrap_err();
        assert_eq!(err.sys_rsn, reason::EXCLUSIVE_UNAVAILABLE);
    }

    #[test]
    fn unallocate_releases_hold() {
        let mut table = DdTable::new();
        let ds = dsn("IBMUSER.JCL");
        let dd = table.allocate(&ds, None, Disposition::Exclusive).unwrap();
        let entry = table.unallocate(&dd).unwrap();
        assert_eq!(entry.dataset, ds);
        assert!(table.is_empty());
        assert!(table.lookup(&dd).is_none());
        table.allocate(&ds, None, Disposition::Exclusive).unwrap();
    }

    #[test]
    fn unallocate_unknown_ddname() {
        let mut table = DdTable::new();
        let err = table.unallocate(&DdName::generated(42)).unwrap_err();
        assert_eq!(err.sys_rsn, reason::DDNAME_NOT_FOUND);
    }
}
