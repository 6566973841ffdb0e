use async_trait::async_trait;

use crate::error::PayoutResult;
use crate::transaction::{Account, PaymentReceipt, SignedTransaction};

/// Call contract of the external payment network.
///
/// Implementations must be `Send + Sync`; one gateway is shared by every
/// request handler.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Fetch the account and its current sequence number.
    async fn lookup_account(&self, id: &str) -> PayoutResult<Account>;

    /// Submit a signed transaction.
    async fn submit(&self, transaction: SignedTransaction) -> PayoutResult<PaymentReceipt>;
}
