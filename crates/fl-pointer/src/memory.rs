//! In-memory pointer store for testing and ephemeral use.

use std::sync::RwLock;

use fl_types::Address;

use crate::error::{PointerError, Result};
use crate::traits::PointerStore;
use crate::types::Pointer;

/// An in-memory implementation of [`PointerStore`].
///
/// The value lives behind a `RwLock` and is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryPointerStore {
    pointer: RwLock<Option<Pointer>>,
}

impl InMemoryPointerStore {
    /// Create a store with no pointer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already pointing at `address`.
    pub fn with_address(address: Address) -> Self {
        Self {
            pointer: RwLock::new(Some(Pointer::new(address))),
        }
    }
}

impl PointerStore for InMemoryPointerStore {
    fn read(&self) -> Result<Option<Pointer>> {
        let pointer = self.pointer.read().map_err(|_| PointerError::LockPoisoned)?;
        Ok(pointer.clone())
    }

    fn write(&self, pointer: &Pointer) -> Result<()> {
        let mut slot = self.pointer.write().map_err(|_| PointerError::LockPoisoned)?;
        *slot = Some(pointer.clone());
        Ok(())
    }

    fn compare_and_swap(&self, expected: Option<&Address>, new: &Pointer) -> Result<bool> {
        let mut slot = self.pointer.write().map_err(|_| PointerError::LockPoisoned)?;
        let current = slot.as_ref().map(Pointer::address);
        if current != expected {
            return Ok(false);
        }
        *slot = Some(new.clone());
        Ok(true)
    }
}
