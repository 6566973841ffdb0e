//! Snapshot pointer management for FeedLedger.
//!
//! The ledger lives in an immutable content store, so "the ledger" is really
//! just whichever snapshot the pointer names. This crate owns that one
//! mutable value.
//!
//! # Modules
//!
//! - [`error`]: Error types for pointer operations
//! - [`types`]: The persisted [`Pointer`] value
//! - [`traits`]: The [`PointerStore`] trait defining the storage interface
//! - [`file`]: Durable [`FilePointerStore`]
//! - [`memory`]: In-memory [`InMemoryPointerStore`] for tests

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{PointerError, Result};
pub use file::FilePointerStore;
pub use memory::InMemoryPointerStore;
pub use traits::PointerStore;
pub use types::Pointer;
