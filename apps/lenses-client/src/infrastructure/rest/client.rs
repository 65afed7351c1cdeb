//! HTTP client for the administration API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::map_status;
use crate::application::ports::{QuotaError, QuotaPort};
use crate::domain::quota::{Quota, QuotaConfig, QuotaTarget};

/// Prefix of every quota resource.
pub const QUOTAS_PATH: &str = "/api/quotas";

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "X-Kafka-Lenses-Token";

/// Connection settings for the administration API.
#[derive(Clone)]
pub struct RestConfig {
    /// Server host including scheme.
    pub host: String,
    /// Authentication token.
    pub token: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("host", &self.host)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the administration API.
#[derive(Debug, Clone)]
pub struct LensesHttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl LensesHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &RestConfig) -> Result<Self, QuotaError> {
        if config.token.is_empty() {
            return Err(QuotaError::NotAccessible);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QuotaError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, QuotaError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// Make a PUT request with a JSON body.
    pub async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), QuotaError> {
        let _: serde_json::Value = self.request(Method::PUT, path, Some(body)).await?;
        Ok(())
    }

    /// Make a DELETE request with a JSON body.
    pub async fn delete<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), QuotaError> {
        let _: serde_json::Value = self.request(Method::DELETE, path, Some(body)).await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, QuotaError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(method = %method, url = %url, "Sending request");

        let mut request = self
            .client
            .request(method, &url)
            .header(TOKEN_HEADER, &self.token);
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = map_status(status, &text);
            tracing::debug!(status = status.as_u16(), error = %err, "Request failed");
            return Err(err);
        }

        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| QuotaError::Json(e.to_string()))
    }
}

#[async_trait]
impl QuotaPort for LensesHttpClient {
    async fn list_quotas(&self) -> Result<Vec<Quota>, QuotaError> {
        let quotas: Option<Vec<Quota>> = self.get(QUOTAS_PATH).await?;
        Ok(quotas.unwrap_or_default())
    }

    async fn set_quota(&self, target: &QuotaTarget, config: &QuotaConfig) -> Result<(), QuotaError> {
        self.put(&format!("{QUOTAS_PATH}{}", target.path()), config)
            .await
    }

    async fn delete_quota(&self, target: &QuotaTarget, keys: &[String]) -> Result<(), QuotaError> {
        let keys: Vec<&str> = if keys.is_empty() {
            QuotaConfig::KEYS.to_vec()
        } else {
            keys.iter().map(String::as_str).collect()
        };

        self.delete(&format!("{QUOTAS_PATH}{}", target.path()), &keys)
            .await
    }
}
