//! HTTP server for FeedLedger.
//!
//! Exposes post upload, author and image queries, the current snapshot
//! address and likes over a small JSON/multipart API. Uploaded images can
//! be mirrored to an external upload proxy after the post is committed.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;
pub mod upload;

pub use config::{ContentStoreConfig, PaymentGatewayConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::FeedServer;
pub use state::{open_ledger, AppState};
pub use upload::{HttpUploadProxy, ProxyCredentials, UploadMirror, UploadProxy, UploadProxyConfig};
