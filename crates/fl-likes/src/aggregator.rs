use std::sync::Arc;

use fl_ledger::{LedgerWriter, MutationOutcome};
use fl_payout::{PaymentReceipt, PayoutError, PayoutTrigger};
use fl_types::{Address, LikeEvent, PostRecord};
use tracing::{debug, info, warn};

use crate::accounting::{apply_delta, LikesConfig};
use crate::error::LikeError;

/// What happened to the payout after a committed like.
#[derive(Debug)]
pub enum PayoutOutcome {
    /// The trigger did not fire, or no payout source is configured.
    NotTriggered,
    Submitted(PaymentReceipt),
    /// The trigger fired but the payment failed. The like stays committed.
    Failed(PayoutError),
}

/// Result of [`LikeAggregator::apply_like`].
#[derive(Debug)]
pub enum LikeResult {
    /// The like or unlike was committed.
    Applied {
        record: PostRecord,
        address: Address,
        payout: PayoutOutcome,
    },
    /// The liker had already liked this post. Nothing was written.
    AlreadyLiked { record: PostRecord },
    /// An unlike from someone who never liked the post. Nothing was written.
    Unchanged { record: PostRecord },
}

/// Applies like events to the ledger and fires payouts.
pub struct LikeAggregator {
    ledger: Arc<dyn LedgerWriter>,
    trigger: Option<Arc<PayoutTrigger>>,
    config: LikesConfig,
}

impl LikeAggregator {
    pub fn new(
        ledger: Arc<dyn LedgerWriter>,
        trigger: Option<Arc<PayoutTrigger>>,
        config: LikesConfig,
    ) -> Self {
        Self {
            ledger,
            trigger,
            config,
        }
    }

    pub fn config(&self) -> &LikesConfig {
        &self.config
    }

    /// Apply one like (`delta > 0`) or unlike (`delta < 0`) from `event`.
    pub async fn apply(&self, event: &LikeEvent) -> Result<LikeResult, LikeError> {
        if event.delta == 0 {
            return Err(LikeError::InvalidDelta);
        }

        let accounting = self.config.accounting;
        let policy = self.trigger.as_deref().map(PayoutTrigger::policy);
        let mutator = |record: &PostRecord| {
            apply_delta(record, &event.liker, event.delta, accounting, policy)
        };

        let outcome = self.ledger.mutate_record(&event.post_id, &mutator).await?;
        let (address, before, after, ledger_len) = match outcome {
            MutationOutcome::Unchanged { record } => {
                debug!(post = %event.post_id, liker = %event.liker, delta = event.delta, "like left record unchanged");
                return Ok(if event.is_like() {
                    LikeResult::AlreadyLiked { record }
                } else {
                    LikeResult::Unchanged { record }
                });
            }
            MutationOutcome::Committed {
                address,
                before,
                after,
                ledger_len,
            } => (address, before, after, ledger_len),
        };
        info!(
            post = %after.id,
            delta = event.delta,
            like_count = after.like_count,
            address = %address,
            "like committed"
        );

        let payout = match &self.trigger {
            Some(trigger) if trigger.fires(&before, &after) => {
                match trigger.execute(&after, ledger_len).await {
                    Ok(receipt) => PayoutOutcome::Submitted(receipt),
                    Err(e) => {
                        warn!(post = %after.id, error = %e, "payout failed; like kept");
                        PayoutOutcome::Failed(e)
                    }
                }
            }
            _ => PayoutOutcome::NotTriggered,
        };

        Ok(LikeResult::Applied {
            record: after,
            address,
            payout,
        })
    }

    /// Convenience over [`apply`](Self::apply).
    pub async fn apply_like(
        &self,
        post_id: fl_types::PostId,
        liker: fl_types::PublicKey,
        delta: i64,
    ) -> Result<LikeResult, LikeError> {
        self.apply(&LikeEvent::new(post_id, liker, delta)).await
    }
}

impl std::fmt::Debug for LikeAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeAggregator")
            .field("trigger", &self.trigger)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::LikeAccounting;
    use fl_crypto::SigningKey;
    use fl_ledger::{LedgerConfig, LedgerReader, SnapshotLedger};
    use fl_payout::{InMemoryPaymentGateway, PayoutConfig, TriggerPolicy};
    use fl_pointer::InMemoryPointerStore;
    use fl_store::InMemoryContentStore;
    use fl_types::{MediaType, PostId, PublicKey};

    struct Harness {
        ledger: Arc<SnapshotLedger>,
        gateway: Arc<InMemoryPaymentGateway>,
        likes: LikeAggregator,
    }

    async fn harness(payout: PayoutConfig, accounting: LikeAccounting) -> Harness {
        let ledger = Arc::new(SnapshotLedger::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryPointerStore::new()),
            LedgerConfig::default(),
        ));
        ledger
            .append_record(PostRecord::new(
                PostId::new("p1").unwrap(),
                PublicKey::new("GAUTHOR").unwrap(),
                "hello",
                MediaType::Text,
                None,
            ))
            .await
            .unwrap();

        let key = SigningKey::generate();
        let gateway = Arc::new(
            InMemoryPaymentGateway::new(payout.network_passphrase.clone())
                .with_account(key.verifying_key().to_hex(), 0),
        );
        let trigger = PayoutTrigger::with_key(gateway.clone(), key, &payout).unwrap();
        let likes = LikeAggregator::new(
            ledger.clone(),
            Some(Arc::new(trigger)),
            LikesConfig { accounting },
        );
        Harness {
            ledger,
            gateway,
            likes,
        }
    }

    fn p1() -> PostId {
        PostId::new("p1").unwrap()
    }

    fn liker(i: usize) -> PublicKey {
        PublicKey::new(format!("GLIKER{i}")).unwrap()
    }

    async fn stored(h: &Harness) -> PostRecord {
        h.ledger.get_by_id(&p1()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn duplicate_like_is_idempotent() {
        let h = harness(PayoutConfig::default(), LikeAccounting::Clamped).await;

        let first = h.likes.apply_like(p1(), liker(1), 1).await.unwrap();
        assert!(matches!(first, LikeResult::Applied { .. }));
        let second = h.likes.apply_like(p1(), liker(1), 1).await.unwrap();
        assert!(matches!(second, LikeResult::AlreadyLiked { .. }));

        assert_eq!(stored(&h).await.like_count, 1);
    }

    #[tokio::test]
    async fn unlike_restores_count_and_membership() {
        let h = harness(PayoutConfig::default(), LikeAccounting::Clamped).await;

        h.likes.apply_like(p1(), liker(1), 1).await.unwrap();
        h.likes.apply_like(p1(), liker(1), -1).await.unwrap();

        let record = stored(&h).await;
        assert_eq!(record.like_count, 0);
        assert!(!record.is_liked_by(&liker(1)));
    }

    #[tokio::test]
    async fn unlike_from_stranger_is_unchanged_when_clamped() {
        let h = harness(PayoutConfig::default(), LikeAccounting::Clamped).await;
        let result = h.likes.apply_like(p1(), liker(7), -1).await.unwrap();
        assert!(matches!(result, LikeResult::Unchanged { .. }));
        assert_eq!(stored(&h).await.like_count, 0);
    }

    #[tokio::test]
    async fn unlike_from_stranger_counts_when_legacy() {
        let h = harness(PayoutConfig::default(), LikeAccounting::Legacy).await;
        h.likes.apply_like(p1(), liker(7), -1).await.unwrap();
        assert_eq!(stored(&h).await.like_count, -1);
    }

    #[tokio::test]
    async fn zero_delta_is_rejected() {
        let h = harness(PayoutConfig::default(), LikeAccounting::Clamped).await;
        assert!(matches!(
            h.likes.apply_like(p1(), liker(1), 0).await,
            Err(LikeError::InvalidDelta)
        ));
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let h = harness(PayoutConfig::default(), LikeAccounting::Clamped).await;
        assert!(matches!(
            h.likes
                .apply_like(PostId::new("nope").unwrap(), liker(1), 1)
                .await,
            Err(LikeError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn ninety_nine_likes_fire_exactly_one_payout() {
        let h = harness(PayoutConfig::default(), LikeAccounting::Clamped).await;

        for i in 0..98 {
            h.likes.apply_like(p1(), liker(i), 1).await.unwrap();
        }
        assert_eq!(h.gateway.submission_count(), 0);

        let result = h.likes.apply_like(p1(), liker(98), 1).await.unwrap();
        assert!(matches!(
            result,
            LikeResult::Applied {
                payout: PayoutOutcome::Submitted(_),
                ..
            }
        ));
        assert_eq!(h.gateway.submission_count(), 1);

        h.likes.apply_like(p1(), liker(99), 1).await.unwrap();
        assert_eq!(h.gateway.submission_count(), 1);
        assert_eq!(stored(&h).await.like_count, 100);

        let tx = &h.gateway.submitted()[0];
        assert_eq!(tx.operation_count(), 1);
        assert_eq!(tx.transaction.operations[0].destination.as_str(), "GAUTHOR");
    }

    #[tokio::test]
    async fn threshold_once_never_pays_twice() {
        let payout = PayoutConfig {
            trigger: TriggerPolicy::ThresholdOnce { threshold: 3 },
            ..Default::default()
        };
        let h = harness(payout, LikeAccounting::Clamped).await;

        for i in 0..3 {
            h.likes.apply_like(p1(), liker(i), 1).await.unwrap();
        }
        assert_eq!(h.gateway.submission_count(), 1);
        assert!(stored(&h).await.payout_fired);

        h.likes.apply_like(p1(), liker(0), -1).await.unwrap();
        h.likes.apply_like(p1(), liker(0), 1).await.unwrap();
        h.likes.apply_like(p1(), liker(5), 1).await.unwrap();
        assert_eq!(h.gateway.submission_count(), 1);
    }

    #[tokio::test]
    async fn failed_payout_keeps_the_like() {
        let payout = PayoutConfig {
            trigger: TriggerPolicy::ExactCount { target: 2 },
            ..Default::default()
        };
        let h = harness(payout, LikeAccounting::Clamped).await;
        h.likes.apply_like(p1(), liker(1), 1).await.unwrap();
        h.gateway.set_unavailable(true);

        let result = h.likes.apply_like(p1(), liker(2), 1).await.unwrap();
        assert!(matches!(
            result,
            LikeResult::Applied {
                payout: PayoutOutcome::Failed(_),
                ..
            }
        ));
        let record = stored(&h).await;
        assert_eq!(record.like_count, 2);
        assert!(record.is_liked_by(&liker(2)));
    }

    #[tokio::test]
    async fn no_trigger_means_no_payout() {
        let ledger = Arc::new(SnapshotLedger::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryPointerStore::new()),
            LedgerConfig::default(),
        ));
        ledger
            .append_record(PostRecord::new(
                p1(),
                PublicKey::new("GAUTHOR").unwrap(),
                "",
                MediaType::Text,
                None,
            ))
            .await
            .unwrap();
        let likes = LikeAggregator::new(ledger, None, LikesConfig::default());
        let result = likes.apply_like(p1(), liker(1), 1).await.unwrap();
        assert!(matches!(
            result,
            LikeResult::Applied {
                payout: PayoutOutcome::NotTriggered,
                ..
            }
        ));
    }
}
