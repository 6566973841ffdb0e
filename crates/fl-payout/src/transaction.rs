//! Payment transaction envelope and its signature.

use fl_crypto::{ContentHasher, Signature, SigningKey, VerifyingKey};
use fl_types::PublicKey;
use serde::{Deserialize, Serialize};

use crate::error::{PayoutError, PayoutResult};

/// An account as reported by the payment gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    /// Last sequence number used by this account.
    #[serde(with = "sequence_number")]
    pub sequence: u64,
}

/// The asset moved by a payment. Only the network's native asset is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    #[default]
    Native,
}

/// One payment inside a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOperation {
    pub destination: PublicKey,
    pub asset: Asset,
    /// Decimal amount, kept as a string as the network expects.
    pub amount: String,
}

/// An unsigned payment transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Hex-encoded public key of the paying account.
    pub source: String,
    /// Must be exactly one past the source account's current sequence.
    pub sequence: u64,
    pub operations: Vec<PaymentOperation>,
}

/// Bytes covered by the signature: the transaction bound to a network.
#[derive(Serialize)]
struct SigningPayload<'a> {
    network_passphrase: &'a str,
    transaction: &'a Transaction,
}

impl Transaction {
    /// Transaction hash under `network_passphrase`, as raw bytes.
    pub fn digest(&self, network_passphrase: &str) -> PayoutResult<[u8; 32]> {
        let payload = SigningPayload {
            network_passphrase,
            transaction: self,
        };
        Ok(ContentHasher::TRANSACTION.digest_json(&payload)?)
    }

    /// Sign this transaction for `network_passphrase`.
    pub fn sign(
        self,
        key: &SigningKey,
        network_passphrase: &str,
    ) -> PayoutResult<SignedTransaction> {
        let digest = self.digest(network_passphrase)?;
        Ok(SignedTransaction {
            hash: hex::encode(digest),
            signature: key.sign(&digest),
            transaction: self,
        })
    }
}

/// A transaction plus its Ed25519 signature by the source account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    /// Hex transaction hash.
    pub hash: String,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Check the hash and the source account's signature under
    /// `network_passphrase`.
    pub fn verify(&self, network_passphrase: &str) -> PayoutResult<()> {
        let digest = self.transaction.digest(network_passphrase)?;
        if hex::encode(digest) != self.hash {
            return Err(PayoutError::Rejected("transaction hash mismatch".into()));
        }
        let signer = VerifyingKey::from_hex(&self.transaction.source)?;
        signer.verify(&digest, &self.signature)?;
        Ok(())
    }

    pub fn operation_count(&self) -> usize {
        self.transaction.operations.len()
    }
}

/// What the gateway hands back for an accepted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub hash: String,
    #[serde(alias = "ledger")]
    pub ledger_sequence: u64,
}

/// Sequence numbers arrive either as JSON numbers or as decimal strings.
mod sequence_number {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
