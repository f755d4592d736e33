//! Scoped allocation: a successful allocate is always paired with one release.

use tracing::{debug, warn, Span};

use crate::allocator::ResourceAllocator;
use crate::error::DynallocError;
use crate::types::{AllocationHandle, AllocationRequest};

/// A held allocation, released when dropped.
///
/// [`Allocation::release`] releases early and reports the outcome; otherwise
/// the release happens on drop (including unwinding) and a failure is only
/// logged.
pub struct Allocation<'a> {
    allocator: &'a dyn ResourceAllocator,
    handle: AllocationHandle,
    released: bool,
    span: Span,
}

impl<'a> Allocation<'a> {
    /// Allocate through `allocator`. Nothing is held on failure.
    pub fn acquire(
        allocator: &'a dyn ResourceAllocator,
        request: &AllocationRequest,
        span: Span,
    ) -> Result<Self, DynallocError> {
        let handle = allocator.allocate(request)?;
        Ok(Self {
            allocator,
            handle,
            released: false,
            span,
        })
    }

    /// The live handle.
    pub fn handle(&self) -> &AllocationHandle {
        &self.handle
    }

    /// Release now.
    pub fn release(mut self) -> Result<(), DynallocError> {
        self.released = true;
        self.allocator.release(&self.handle)
    }
}

impl Drop for Allocation<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.allocator.release(&self.handle) {
            Ok(()) => debug!(parent: &self.span, ddname = %self.handle.ddname, "released on scope exit"),
            Err(err) => warn!(
                parent: &self.span,
                ddname = %self.handle.ddname,
                dsn = %self.handle.dataset,
                rc = err.rc.code(),
                sys_rc = err.sys_rc,
                sys_rsn = %format_args!("0x{:08X}", err.sys_rsn),
                "release failed"
            ),
        }
    }
}

impl std::fmt::Debug for Allocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocation")
            .field("handle", &self.handle)
            .field("released", &self.released)
            .finish()
    }
}
