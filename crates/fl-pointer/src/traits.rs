//! The [`PointerStore`] trait defining the pointer storage interface.

use fl_types::Address;

use crate::error::{PointerError, Result};
use crate::types::Pointer;

/// Storage backend for the snapshot pointer.
///
/// Implementations must be thread-safe (`Send + Sync`). Each call is atomic
/// on its own, but no lock is held *between* calls: a caller that reads,
/// computes, and then writes can overwrite a concurrent writer. Callers that
/// need read-modify-write safety use [`PointerStore::compare_and_swap`].
pub trait PointerStore: Send + Sync {
    /// Read the current pointer.
    ///
    /// Returns `Ok(None)` if no pointer has been written yet.
    fn read(&self) -> Result<Option<Pointer>>;

    /// Unconditionally overwrite the pointer.
    fn write(&self, pointer: &Pointer) -> Result<()>;

    /// Replace the pointer with `new` only if it currently names `expected`
    /// (`None` meaning "no pointer yet").
    ///
    /// Returns `Ok(true)` if the swap happened, `Ok(false)` if the pointer
    /// had moved.
    fn compare_and_swap(&self, expected: Option<&Address>, new: &Pointer) -> Result<bool>;

    /// Read the current pointer, treating absence as an error.
    fn current(&self) -> Result<Pointer> {
        self.read()?.ok_or(PointerError::NotFound)
    }
}
