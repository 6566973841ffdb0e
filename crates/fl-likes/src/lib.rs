//! Like aggregation for FeedLedger.
//!
//! A like is one ledger mutation: the liker's key is added to (or removed
//! from) the post's liker set and the count moves accordingly. Once the
//! mutation is committed, the payout trigger is evaluated on the new count.
//!
//! A payout failure never rolls the like back.

pub mod accounting;
pub mod aggregator;
pub mod error;

pub use accounting::{apply_delta, LikeAccounting, LikesConfig};
pub use aggregator::{LikeAggregator, LikeResult, PayoutOutcome};
pub use error::LikeError;
