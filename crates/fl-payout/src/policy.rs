//! Named payout policies: when a payout fires and whom it pays.

use fl_types::PostRecord;
use serde::{Deserialize, Serialize};

use crate::transaction::{Asset, PaymentOperation};

/// Decides whether a committed like crosses the payout line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Fires whenever a like lands the count exactly on `target`. A multi-like
    /// that jumps over the target never fires; dropping back onto it fires
    /// again.
    ExactCount { target: i64 },
    /// Fires the first time the count reaches `threshold`. The post's
    /// `payout_fired` flag is set in the same ledger write, so it fires at
    /// most once per post.
    ThresholdOnce { threshold: i64 },
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self::ExactCount { target: 99 }
    }
}

impl TriggerPolicy {
    /// Adjust the record a like is about to commit. Runs inside the ledger
    /// mutation and must be re-runnable.
    pub fn prepare(&self, after: &mut PostRecord) {
        if let Self::ThresholdOnce { threshold } = self {
            if after.like_count >= *threshold {
                after.payout_fired = true;
            }
        }
    }

    /// Whether the transition `before -> after` pays out.
    pub fn fires(&self, before: &PostRecord, after: &PostRecord) -> bool {
        match self {
            Self::ExactCount { target } => {
                after.like_count == *target && before.like_count != after.like_count
            }
            Self::ThresholdOnce { .. } => !before.payout_fired && after.payout_fired,
        }
    }
}

/// Who gets paid, and how many payment operations are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutPlan {
    /// One operation per record in the ledger, each to the liked post's
    /// author.
    #[default]
    LedgerFanout,
    /// A single operation to the liked post's author.
    AuthorOnce,
}

impl PayoutPlan {
    /// Build the payment operations for a payout on `liked`, given the number
    /// of records in the committed ledger.
    pub fn operations(
        &self,
        liked: &PostRecord,
        ledger_len: usize,
        amount: &str,
    ) -> Vec<PaymentOperation> {
        let count = match self {
            Self::LedgerFanout => ledger_len.max(1),
            Self::AuthorOnce => 1,
        };
        let op = PaymentOperation {
            destination: liked.author.clone(),
            asset: Asset::Native,
            amount: amount.to_string(),
        };
        vec![op; count]
    }
}
