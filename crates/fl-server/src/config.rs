use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use fl_ledger::LedgerConfig;
use fl_likes::LikesConfig;
use fl_payout::{HttpGatewayConfig, PayoutConfig};
use fl_store::IpfsConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::upload::UploadProxyConfig;

/// Default multipart body limit: 32 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 << 20;

/// Server configuration, usually loaded from a TOML file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// File holding the current snapshot pointer.
    pub pointer_path: PathBuf,
    /// Prepended to an image's content address to form its public URL.
    pub image_url_prefix: String,
    pub max_upload_bytes: usize,
    pub content_store: ContentStoreConfig,
    pub ledger: LedgerConfig,
    pub likes: LikesConfig,
    pub payout: PayoutConfig,
    pub payment_gateway: PaymentGatewayConfig,
    /// Where uploaded images are mirrored. Mirroring is off when absent.
    pub upload_proxy: Option<UploadProxyConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            pointer_path: PathBuf::from("mainCID.json"),
            image_url_prefix: "http://127.0.0.1:8080/ipfs/".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            content_store: ContentStoreConfig::default(),
            ledger: LedgerConfig::default(),
            likes: LikesConfig::default(),
            payout: PayoutConfig::default(),
            payment_gateway: PaymentGatewayConfig::default(),
            upload_proxy: None,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

/// Which content store backs snapshots and images.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentStoreConfig {
    /// Process-local store. Contents vanish on restart.
    #[default]
    Memory,
    Ipfs(IpfsConfig),
}

/// Which payment network payouts go to.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentGatewayConfig {
    /// In-process gateway with the payout source account pre-opened.
    #[default]
    Memory,
    Http(HttpGatewayConfig),
}
