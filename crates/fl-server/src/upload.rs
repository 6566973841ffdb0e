//! Mirroring uploaded images to an external upload proxy.
//!
//! The proxy is a separate service: we log in with fixed credentials to get
//! a bearer token, then post the file as multipart form data. Mirroring runs
//! after the post is committed and never affects the response.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{ServerError, ServerResult};

/// Upload proxy endpoint and credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadProxyConfig {
    pub base_url: String,
    pub user_name: String,
    pub mpin: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UploadProxyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3001".to_string(),
            user_name: String::new(),
            mpin: String::new(),
            timeout_secs: 30,
        }
    }
}

impl UploadProxyConfig {
    pub fn credentials(&self) -> ProxyCredentials {
        ProxyCredentials {
            user_name: self.user_name.clone(),
            mpin: self.mpin.clone(),
        }
    }
}

impl std::fmt::Debug for UploadProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadProxyConfig")
            .field("base_url", &self.base_url)
            .field("user_name", &self.user_name)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Login body expected by the proxy.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ProxyCredentials {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub mpin: String,
}

impl std::fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProxyCredentials({}, <redacted>)", self.user_name)
    }
}

/// Contract of the external upload proxy.
#[async_trait]
pub trait UploadProxy: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &ProxyCredentials) -> ServerResult<String>;

    /// Upload one file on behalf of `owner_id`.
    async fn upload(
        &self,
        token: &str,
        data: Bytes,
        file_name: &str,
        owner_id: &str,
    ) -> ServerResult<()>;
}

/// Upload proxy over HTTP: `POST /v1/login`, `POST /v1/upload-data`.
pub struct HttpUploadProxy {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

impl HttpUploadProxy {
    pub fn new(config: &UploadProxyConfig) -> ServerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServerError::Config(format!("HTTP client error: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl UploadProxy for HttpUploadProxy {
    async fn login(&self, credentials: &ProxyCredentials) -> ServerResult<String> {
        let response = self
            .client
            .post(format!("{}/v1/login", self.base_url))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ServerError::Upload(format!("login failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ServerError::Upload(format!(
                "login returned {}",
                response.status()
            )));
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| ServerError::Upload(format!("login response: {e}")))?
            .token
            .ok_or_else(|| ServerError::Upload("invalid token response".into()))
    }

    async fn upload(
        &self,
        token: &str,
        data: Bytes,
        file_name: &str,
        owner_id: &str,
    ) -> ServerResult<()> {
        let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("uid", owner_id.to_string())
            .part("files", part);

        let response = self
            .client
            .post(format!("{}/v1/upload-data", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServerError::Upload(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServerError::Upload(format!("upload returned {status} - {body}")));
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpUploadProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUploadProxy")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// An upload proxy together with the credentials used to log in.
#[derive(Clone)]
pub struct UploadMirror {
    proxy: Arc<dyn UploadProxy>,
    credentials: ProxyCredentials,
}

impl UploadMirror {
    pub fn new(proxy: Arc<dyn UploadProxy>, credentials: ProxyCredentials) -> Self {
        Self { proxy, credentials }
    }

    /// Log in and upload in a detached task. Failures are only logged.
    pub fn spawn(&self, data: Bytes, file_name: String, owner_id: String) -> JoinHandle<()> {
        let proxy = self.proxy.clone();
        let credentials = self.credentials.clone();
        tokio::spawn(async move {
            let result: ServerResult<()> = async {
                let token = proxy.login(&credentials).await?;
                proxy.upload(&token, data, &file_name, &owner_id).await
            }
            .await;
            match result {
                Ok(()) => debug!(file = %file_name, owner = %owner_id, "image mirrored"),
                Err(e) => warn!(file = %file_name, owner = %owner_id, error = %e, "image mirror failed"),
            }
        })
    }
}

impl std::fmt::Debug for UploadMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadMirror")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
