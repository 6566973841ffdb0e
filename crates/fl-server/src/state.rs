//! Application state shared by every handler.

use std::sync::Arc;

use fl_ledger::SnapshotLedger;
use fl_likes::LikeAggregator;
use fl_payout::{
    HttpPaymentGateway, InMemoryPaymentGateway, PaymentGateway, PayoutError, PayoutTrigger,
};
use fl_pointer::{FilePointerStore, InMemoryPointerStore, PointerStore};
use fl_store::{ContentStore, InMemoryContentStore, IpfsContentStore};
use tracing::{info, warn};

use crate::config::{ContentStoreConfig, PaymentGatewayConfig, ServerConfig};
use crate::error::ServerResult;
use crate::upload::{HttpUploadProxy, UploadMirror};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<SnapshotLedger>,
    /// Where uploaded images are stored. Usually the ledger's own store.
    pub images: Arc<dyn ContentStore>,
    pub likes: Arc<LikeAggregator>,
    pub mirror: Option<UploadMirror>,
    pub image_url_prefix: String,
}

impl AppState {
    pub fn new(
        ledger: Arc<SnapshotLedger>,
        likes: Arc<LikeAggregator>,
        mirror: Option<UploadMirror>,
        image_url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            images: ledger.store().clone(),
            ledger,
            likes,
            mirror,
            image_url_prefix: image_url_prefix.into(),
        }
    }

    /// Wire up stores, ledger, payout and mirroring from configuration.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let ledger = Arc::new(open_ledger(config)?);

        let trigger = match build_trigger(config) {
            Ok(trigger) => Some(Arc::new(trigger)),
            Err(PayoutError::Configuration(reason)) if config.payout.source_secret.is_none() => {
                warn!(%reason, "payouts disabled");
                None
            }
            Err(e) => return Err(e.into()),
        };
        let likes = Arc::new(LikeAggregator::new(
            ledger.clone(),
            trigger,
            config.likes.clone(),
        ));

        let mirror = match &config.upload_proxy {
            Some(proxy) => {
                let http = HttpUploadProxy::new(proxy)?;
                info!(base_url = %proxy.base_url, "mirroring uploads");
                Some(UploadMirror::new(Arc::new(http), proxy.credentials()))
            }
            None => None,
        };

        Ok(Self::new(ledger, likes, mirror, config.image_url_prefix.clone()))
    }
}

/// Open the ledger described by `config` without any of the HTTP wiring.
///
/// An in-memory content store is paired with an in-memory pointer: a pointer
/// file would outlive the blobs it names and dangle after a restart.
pub fn open_ledger(config: &ServerConfig) -> ServerResult<SnapshotLedger> {
    let (store, pointer): (Arc<dyn ContentStore>, Arc<dyn PointerStore>) =
        match &config.content_store {
            ContentStoreConfig::Memory => {
                warn!(
                    pointer = %config.pointer_path.display(),
                    "using in-memory content store; posts are lost on restart and the pointer file is not used"
                );
                (
                    Arc::new(InMemoryContentStore::new()),
                    Arc::new(InMemoryPointerStore::new()),
                )
            }
            ContentStoreConfig::Ipfs(ipfs) => (
                Arc::new(IpfsContentStore::new(ipfs.clone())?),
                Arc::new(FilePointerStore::new(&config.pointer_path)),
            ),
        };
    Ok(SnapshotLedger::new(store, pointer, config.ledger.clone()))
}

fn build_trigger(config: &ServerConfig) -> Result<PayoutTrigger, PayoutError> {
    match &config.payment_gateway {
        PaymentGatewayConfig::Http(http) => {
            let gateway: Arc<dyn PaymentGateway> = Arc::new(HttpPaymentGateway::new(http.clone())?);
            PayoutTrigger::new(gateway, &config.payout)
        }
        PaymentGatewayConfig::Memory => {
            let gateway = Arc::new(InMemoryPaymentGateway::new(
                config.payout.network_passphrase.clone(),
            ));
            let trigger = PayoutTrigger::new(gateway.clone(), &config.payout)?;
            gateway.open_account(trigger.source_account(), 0);
            Ok(trigger)
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ledger", &self.ledger)
            .field("likes", &self.likes)
            .field("mirror", &self.mirror)
            .field("image_url_prefix", &self.image_url_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_ledger::{LedgerReader, LedgerWriter};
    use fl_types::{MediaType, PostId, PostRecord, PublicKey};

    fn post(id: &str) -> PostRecord {
        PostRecord::new(
            PostId::new(id).unwrap(),
            PublicKey::new("GA1").unwrap(),
            "hello",
            MediaType::Text,
            None,
        )
    }

    #[tokio::test]
    async fn memory_ledger_reopens_empty_and_writable() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            pointer_path: dir.path().join("mainCID.json"),
            ..Default::default()
        };

        let first = open_ledger(&config).unwrap();
        first.append_record(post("p1")).await.unwrap();
        drop(first);
        assert!(!config.pointer_path.exists());

        let reopened = open_ledger(&config).unwrap();
        assert!(reopened.get_all().await.unwrap().is_empty());
        reopened.append_record(post("p2")).await.unwrap();
        assert_eq!(reopened.get_all().await.unwrap().len(), 1);
    }
}
