//! Content-addressed blob storage for FeedLedger.
//!
//! Every ledger snapshot and every uploaded image is stored as an immutable
//! blob identified by its content address. The store is append-only by
//! contract: nothing is ever overwritten or deleted, which is what lets the
//! ledger treat an address as a frozen snapshot.
//!
//! # Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//! - [`IpfsContentStore`] -- IPFS node over its HTTP API
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written.
//! 2. Write-then-link: a blob is fully stored before anything points at it.
//! 3. The store never interprets blob contents.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod ipfs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use ipfs::{IpfsConfig, IpfsContentStore};
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
