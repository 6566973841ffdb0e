use async_trait::async_trait;
use bytes::Bytes;
use fl_types::Address;

use crate::error::{StoreError, StoreResult};

/// Immutable, content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written; the same bytes always yield the same
///   address.
/// - `put` is idempotent.
/// - Nothing is ever deleted or rewritten in place.
/// - The store never interprets blob contents.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `data` and return its content address.
    async fn put(&self, data: Bytes) -> StoreResult<Address>;

    /// Fetch the blob stored under `address`.
    ///
    /// Returns `Err(StoreError::NotFound)` if no such blob exists.
    async fn get(&self, address: &Address) -> StoreResult<Bytes>;

    /// Check whether a blob exists.
    ///
    /// Default implementation performs a full `get`.
    async fn exists(&self, address: &Address) -> StoreResult<bool> {
        match self.get(address).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
