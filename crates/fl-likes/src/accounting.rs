use fl_ledger::RecordMutation;
use fl_payout::TriggerPolicy;
use fl_types::{PostRecord, PublicKey};
use serde::{Deserialize, Serialize};

/// How an unlike moves the like count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeAccounting {
    /// The count changes only if the liker was present, and never drops
    /// below zero.
    #[default]
    Clamped,
    /// The count moves by the delta whether or not the liker was present.
    /// May go negative.
    Legacy,
}

/// Like aggregation settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LikesConfig {
    pub accounting: LikeAccounting,
}

/// The pure like/unlike transition for one record.
///
/// `policy` is applied to the new record so a one-shot payout flag lands in
/// the same ledger write as the like.
pub fn apply_delta(
    record: &PostRecord,
    liker: &PublicKey,
    delta: i64,
    accounting: LikeAccounting,
    policy: Option<&TriggerPolicy>,
) -> RecordMutation {
    let present = record.is_liked_by(liker);
    let mut next = record.clone();

    if delta > 0 {
        if present {
            return RecordMutation::Unchanged;
        }
        next.likers.insert(liker.clone());
        next.like_count = next.like_count.saturating_add(delta);
    } else {
        match accounting {
            LikeAccounting::Clamped => {
                if !present {
                    return RecordMutation::Unchanged;
                }
                next.likers.remove(liker);
                next.like_count = next.like_count.saturating_add(delta).max(0);
            }
            LikeAccounting::Legacy => {
                next.likers.remove(liker);
                next.like_count = next.like_count.saturating_add(delta);
            }
        }
    }

    if let Some(policy) = policy {
        policy.prepare(&mut next);
    }
    RecordMutation::Replace(next)
}
