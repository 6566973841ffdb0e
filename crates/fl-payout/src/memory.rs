use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{PayoutError, PayoutResult};
use crate::gateway::PaymentGateway;
use crate::transaction::{Account, PaymentReceipt, SignedTransaction};

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, u64>,
    submitted: Vec<SignedTransaction>,
    unavailable: bool,
}

/// In-memory payment network for tests and local runs.
///
/// Verifies every signature against its network passphrase, enforces
/// sequence numbers, and records each accepted transaction.
pub struct InMemoryPaymentGateway {
    network_passphrase: String,
    inner: RwLock<Inner>,
}

impl InMemoryPaymentGateway {
    pub fn new(network_passphrase: impl Into<String>) -> Self {
        Self {
            network_passphrase: network_passphrase.into(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register (or reset) an account at `sequence`.
    pub fn open_account(&self, id: impl Into<String>, sequence: u64) {
        self.inner
            .write()
            .expect("lock poisoned")
            .accounts
            .insert(id.into(), sequence);
    }

    /// Builder form of [`open_account`](Self::open_account).
    pub fn with_account(self, id: impl Into<String>, sequence: u64) -> Self {
        self.open_account(id, sequence);
        self
    }

    /// Make every subsequent call fail as if the network were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.write().expect("lock poisoned").unavailable = unavailable;
    }

    /// All accepted transactions, oldest first.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.inner.read().expect("lock poisoned").submitted.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").submitted.len()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn lookup_account(&self, id: &str) -> PayoutResult<Account> {
        let inner = self.inner.read().expect("lock poisoned");
        if inner.unavailable {
            return Err(PayoutError::Unavailable("in-memory gateway offline".into()));
        }
        inner
            .accounts
            .get(id)
            .map(|&sequence| Account {
                id: id.to_string(),
                sequence,
            })
            .ok_or_else(|| PayoutError::AccountNotFound(id.to_string()))
    }

    async fn submit(&self, transaction: SignedTransaction) -> PayoutResult<PaymentReceipt> {
        transaction.verify(&self.network_passphrase)?;

        let mut inner = self.inner.write().expect("lock poisoned");
        if inner.unavailable {
            return Err(PayoutError::Unavailable("in-memory gateway offline".into()));
        }
        if transaction.transaction.operations.is_empty() {
            return Err(PayoutError::Rejected("transaction has no operations".into()));
        }

        let source = transaction.transaction.source.clone();
        let current = *inner
            .accounts
            .get(&source)
            .ok_or_else(|| PayoutError::AccountNotFound(source.clone()))?;
        if transaction.transaction.sequence != current + 1 {
            return Err(PayoutError::Rejected(format!(
                "bad sequence {} (account at {current})",
                transaction.transaction.sequence
            )));
        }
        inner.accounts.insert(source, current + 1);

        let receipt = PaymentReceipt {
            hash: transaction.hash.clone(),
            ledger_sequence: inner.submitted.len() as u64 + 1,
        };
        inner.submitted.push(transaction);
        Ok(receipt)
    }
}

impl std::fmt::Debug for InMemoryPaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPaymentGateway")
            .field("network_passphrase", &self.network_passphrase)
            .field("submitted", &self.submission_count())
            .finish()
    }
}
