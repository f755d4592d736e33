//! # Dynamic allocation
//!
//! Binds host datasets to DD names for the duration of an operation and
//! classifies allocation failures.
//!
//! - **names**: dataset, member and DD names; the `NAME(MEMBER)` grammar
//! - **catalog**: directory-backed dataset catalog
//! - **dd_table**: DD bindings with shared/exclusive serialization
//! - **allocator**: the `ResourceAllocator` boundary and `HostAllocator`
//! - **guard**: `Allocation`, releasing on scope exit
//! - **dataset**: record-oriented reads through an allocated DD
//! - **translate**: status triple to failure class, HTTP status and message

#![forbid(unsafe_code)]

pub mod allocator;
pub mod catalog;
pub mod dataset;
pub mod dd_table;
pub mod error;
pub mod guard;
pub mod names;
pub mod translate;
pub mod types;

pub use allocator::{HostAllocator, ResourceAllocator};
pub use catalog::{Catalog, CatalogEntry, DatasetDefinition};
pub use dataset::{DatasetAccess, DatasetInput, RecordStream};
pub use error::{reason, DatasetError, DynallocError, DynallocRc, NameError};
pub use guard::Allocation;
pub use names::{DatasetName, DatasetPath, DdName, MemberName};
pub use translate::{translate, AllocFailure, Site, Translation};
pub use types::{
    AllocFlags, AllocationHandle, AllocationRequest, DatasetAttributes, Disposition, RecordFormat,
};
