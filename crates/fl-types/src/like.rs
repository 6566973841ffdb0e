use serde::{Deserialize, Serialize};

use crate::identity::{PostId, PublicKey};

/// A like (`delta > 0`) or unlike (`delta < 0`) request. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeEvent {
    pub post_id: PostId,
    pub liker: PublicKey,
    pub delta: i64,
}

impl LikeEvent {
    pub fn new(post_id: PostId, liker: PublicKey, delta: i64) -> Self {
        Self {
            post_id,
            liker,
            delta,
        }
    }

    pub fn is_like(&self) -> bool {
        self.delta > 0
    }

    pub fn is_unlike(&self) -> bool {
        self.delta < 0
    }
}
