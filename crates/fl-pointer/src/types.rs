//! The persisted pointer value.

use fl_types::Address;
use serde::{Deserialize, Serialize};

/// The single mutable value in the system: the address of the current
/// ledger snapshot.
///
/// Persisted as `{"address": "<string>"}`. Files written by older
/// deployments used the key `"CID"`, which is still accepted on read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    #[serde(alias = "CID")]
    pub address: Address,
}

impl Pointer {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl From<Address> for Pointer {
    fn from(address: Address) -> Self {
        Self::new(address)
    }
}
