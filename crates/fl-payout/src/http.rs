//! Payment gateway over a JSON HTTP API.
//!
//! `GET {base}/accounts/{id}` returns an [`Account`];
//! `POST {base}/transactions` accepts a [`SignedTransaction`] and returns a
//! [`PaymentReceipt`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PayoutError, PayoutResult};
use crate::gateway::PaymentGateway;
use crate::transaction::{Account, PaymentReceipt, SignedTransaction};

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct HttpPaymentGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(config: HttpGatewayConfig) -> PayoutResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PayoutError::Configuration(format!("HTTP client error: {e}")))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn lookup_account(&self, id: &str) -> PayoutResult<Account> {
        let response = self
            .client
            .get(self.url(&format!("accounts/{id}")))
            .send()
            .await
            .map_err(|e| PayoutError::Unavailable(format!("account lookup failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PayoutError::AccountNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(PayoutError::Unavailable(format!(
                "account lookup returned {}",
                response.status()
            )));
        }

        response
            .json::<Account>()
            .await
            .map_err(|e| PayoutError::MalformedResponse(format!("account response: {e}")))
    }

    async fn submit(&self, transaction: SignedTransaction) -> PayoutResult<PaymentReceipt> {
        debug!(
            hash = %transaction.hash,
            operations = transaction.operation_count(),
            "submitting transaction"
        );
        let response = self
            .client
            .post(self.url("transactions"))
            .json(&transaction)
            .send()
            .await
            .map_err(|e| PayoutError::Unavailable(format!("submit failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PayoutError::Rejected(format!("{status} - {body}")));
        }

        response
            .json::<PaymentReceipt>()
            .await
            .map_err(|e| PayoutError::MalformedResponse(format!("submit response: {e}")))
    }
}

impl std::fmt::Debug for HttpPaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPaymentGateway")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_without_double_slash() {
        let gateway = HttpPaymentGateway::new(HttpGatewayConfig {
            base_url: "https://pay.example/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(gateway.url("transactions"), "https://pay.example/transactions");
    }

    #[tokio::test]
    async fn unreachable_gateway_is_unavailable() {
        let gateway = HttpPaymentGateway::new(HttpGatewayConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
        })
        .unwrap();
        assert!(matches!(
            gateway.lookup_account("GX").await,
            Err(PayoutError::Unavailable(_))
        ));
    }
}
