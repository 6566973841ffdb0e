use bytes::Bytes;
use fl_types::{Address, PostRecord};

use crate::error::{LedgerError, LedgerResult};

/// Encode a full ledger snapshot as the JSON array stored in the content
/// store.
pub fn encode(records: &[PostRecord]) -> LedgerResult<Bytes> {
    serde_json::to_vec(records)
        .map(Bytes::from)
        .map_err(|e| LedgerError::Serialization(e.to_string()))
}

/// Decode the snapshot stored at `address`.
///
/// An empty or whitespace-only blob decodes as an empty ledger, so a pointer
/// bootstrapped at an empty file still works.
pub fn decode(address: &Address, data: &[u8]) -> LedgerResult<Vec<PostRecord>> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(data).map_err(|e| LedgerError::CorruptSnapshot {
        address: address.clone(),
        reason: e.to_string(),
    })
}
