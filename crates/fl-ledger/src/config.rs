use serde::{Deserialize, Serialize};

/// How a mutation advances the pointer once its new snapshot is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Swap the pointer only if it still names the snapshot the mutation
    /// started from; otherwise recompute from the fresh snapshot and retry.
    #[default]
    CompareAndSwap,
    /// Overwrite the pointer unconditionally. Concurrent writers lose
    /// updates. Kept for compatibility testing only.
    Unguarded,
}

/// Ledger service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub commit_policy: CommitPolicy,
    /// Upper bound on compare-and-swap attempts per mutation.
    pub max_commit_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            commit_policy: CommitPolicy::CompareAndSwap,
            max_commit_attempts: 32,
        }
    }
}

impl LedgerConfig {
    /// Legacy last-writer-wins configuration.
    pub fn unguarded() -> Self {
        Self {
            commit_policy: CommitPolicy::Unguarded,
            ..Default::default()
        }
    }
}
