use std::sync::Arc;

use fl_crypto::SigningKey;
use fl_types::PostRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PayoutError, PayoutResult};
use crate::gateway::PaymentGateway;
use crate::policy::{PayoutPlan, TriggerPolicy};
use crate::transaction::{PaymentReceipt, Transaction};

/// Payout configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfig {
    /// Hex-encoded 32-byte Ed25519 seed of the paying account.
    pub source_secret: Option<String>,
    /// Amount per payment operation, in the native asset.
    pub amount: String,
    /// Network the transaction signature is bound to.
    pub network_passphrase: String,
    pub trigger: TriggerPolicy,
    pub plan: PayoutPlan,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            source_secret: None,
            amount: "50".to_string(),
            network_passphrase: "Test SDF Network ; September 2015".to_string(),
            trigger: TriggerPolicy::default(),
            plan: PayoutPlan::default(),
        }
    }
}

impl std::fmt::Debug for PayoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayoutConfig")
            .field("source_secret", &self.source_secret.as_ref().map(|_| "<redacted>"))
            .field("amount", &self.amount)
            .field("network_passphrase", &self.network_passphrase)
            .field("trigger", &self.trigger)
            .field("plan", &self.plan)
            .finish()
    }
}

/// Turns a threshold crossing into a signed payment.
pub struct PayoutTrigger {
    gateway: Arc<dyn PaymentGateway>,
    source: SigningKey,
    amount: String,
    network_passphrase: String,
    policy: TriggerPolicy,
    plan: PayoutPlan,
}

impl PayoutTrigger {
    /// Build a trigger from config. Fails if the source secret is missing or
    /// malformed, or the amount is blank.
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: &PayoutConfig) -> PayoutResult<Self> {
        let secret = config
            .source_secret
            .as_deref()
            .ok_or_else(|| PayoutError::Configuration("source_secret is not set".into()))?;
        let source = SigningKey::from_hex(secret)
            .map_err(|_| PayoutError::Configuration("source_secret is not a hex seed".into()))?;
        Self::with_key(gateway, source, config)
    }

    /// Build a trigger paying from `source`.
    pub fn with_key(
        gateway: Arc<dyn PaymentGateway>,
        source: SigningKey,
        config: &PayoutConfig,
    ) -> PayoutResult<Self> {
        if config.amount.trim().is_empty() {
            return Err(PayoutError::Configuration("amount is empty".into()));
        }
        Ok(Self {
            gateway,
            source,
            amount: config.amount.clone(),
            network_passphrase: config.network_passphrase.clone(),
            policy: config.trigger.clone(),
            plan: config.plan,
        })
    }

    pub fn policy(&self) -> &TriggerPolicy {
        &self.policy
    }

    pub fn plan(&self) -> PayoutPlan {
        self.plan
    }

    /// Account id payouts are drawn from.
    pub fn source_account(&self) -> String {
        self.source.verifying_key().to_hex()
    }

    /// See [`TriggerPolicy::prepare`].
    pub fn prepare(&self, after: &mut PostRecord) {
        self.policy.prepare(after)
    }

    /// See [`TriggerPolicy::fires`].
    pub fn fires(&self, before: &PostRecord, after: &PostRecord) -> bool {
        self.policy.fires(before, after)
    }

    /// Pay out for `liked`. `ledger_len` is the number of records in the
    /// snapshot the like was committed to.
    pub async fn execute(
        &self,
        liked: &PostRecord,
        ledger_len: usize,
    ) -> PayoutResult<PaymentReceipt> {
        let source_id = self.source_account();
        let account = self.gateway.lookup_account(&source_id).await?;
        debug!(account = %account.id, sequence = account.sequence, "payout source loaded");

        let sequence = account.sequence.checked_add(1).ok_or_else(|| {
            PayoutError::MalformedResponse(format!(
                "account {} sequence {} cannot be advanced",
                account.id, account.sequence
            ))
        })?;
        let operations = self.plan.operations(liked, ledger_len, &self.amount);
        let op_count = operations.len();
        let signed = Transaction {
            source: source_id,
            sequence,
            operations,
        }
        .sign(&self.source, &self.network_passphrase)?;

        let receipt = self.gateway.submit(signed).await?;
        info!(
            post = %liked.id,
            author = %liked.author,
            operations = op_count,
            hash = %receipt.hash,
            "payout submitted"
        );
        Ok(receipt)
    }
}

impl std::fmt::Debug for PayoutTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayoutTrigger")
            .field("source", &self.source_account())
            .field("policy", &self.policy)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}
