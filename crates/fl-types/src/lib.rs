//! Foundation types for FeedLedger.
//!
//! This crate provides the identity, addressing, and record types shared by
//! every other FeedLedger crate.
//!
//! # Key Types
//!
//! - [`Address`]: Opaque content address returned by a content store
//! - [`PostId`]: Unique post identifier (10 alphanumeric characters)
//! - [`PublicKey`]: Liker / author account key as presented by clients
//! - [`PostRecord`]: One post plus its social metadata (likes)
//! - [`MediaType`]: Text, image, or mixed post
//! - [`LikeEvent`]: Transient like/unlike request

pub mod address;
pub mod error;
pub mod identity;
pub mod like;
pub mod post;

pub use address::Address;
pub use error::TypeError;
pub use identity::{PostId, PublicKey};
pub use like::LikeEvent;
pub use post::{MediaType, PostRecord};
