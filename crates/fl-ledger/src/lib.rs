//! Post ledger for FeedLedger.
//!
//! The ledger is the ordered list of every [`PostRecord`](fl_types::PostRecord)
//! ever uploaded, stored as one immutable JSON snapshot per version. A single
//! pointer names the current snapshot. This crate provides:
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - [`SnapshotLedger`], the read-modify-write service over a content store
//!   and a pointer store
//! - Pure query projections (by author, by author and image, by id)
//! - Snapshot encoding

pub mod config;
pub mod error;
pub mod projection;
pub mod service;
pub mod snapshot;
pub mod traits;

pub use config::{CommitPolicy, LedgerConfig};
pub use error::{LedgerError, LedgerResult};
pub use service::SnapshotLedger;
pub use traits::{LedgerReader, LedgerWriter, MutationOutcome, Mutator, RecordMutation};
