use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use fl_crypto::ContentHasher;
use fl_types::Address;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// In-memory, HashMap-based content store.
///
/// Intended for tests, local development and embedding. Addresses are hex
/// BLAKE3 digests of the blob bytes. Blobs are held as [`Bytes`], so reads
/// are cheap reference-counted clones.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<Address, Bytes>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|blob| blob.len() as u64)
            .sum()
    }

    /// Return a sorted list of all addresses in the store.
    pub fn all_addresses(&self) -> Vec<Address> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut addrs: Vec<Address> = map.keys().cloned().collect();
        addrs.sort();
        addrs
    }

    /// Store `data` synchronously. Used by tests that need to plant blobs.
    pub fn put_blocking(&self, data: impl Into<Bytes>) -> Address {
        let data = data.into();
        let address = ContentHasher::BLOB.address(&data);
        self.blobs
            .write()
            .expect("lock poisoned")
            .entry(address.clone())
            .or_insert(data);
        address
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, data: Bytes) -> StoreResult<Address> {
        Ok(self.put_blocking(data))
    }

    async fn get(&self, address: &Address) -> StoreResult<Bytes> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(address)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(address.clone()))
    }

    async fn exists(&self, address: &Address) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(address))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
