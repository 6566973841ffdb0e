//! Cryptographic primitives for FeedLedger.
//!
//! Provides domain-separated BLAKE3 content addressing for the local content
//! store and Ed25519 signing for payout transactions.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod signer;

pub use hasher::{ContentHasher, HasherError};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
