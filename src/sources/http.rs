//! HTTP adapter for vendor telemetry APIs.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::SourceConfig;

use super::{
    corrections, RawAccessMetric, RawSensorItem, RawUserItem, SourceError, TelemetrySource,
};

const ACCESS_TOKEN_HEADER: &str = "Access-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct VendorResponse<T> {
    data: Vec<T>,
}

/// One vendor endpoint speaking the common `{"data": [...]}` contract with
/// `Access-Token` header auth.
pub struct HttpSource {
    client: Client,
    config: SourceConfig,
}

impl HttpSource {
    pub fn new(client: Client, config: SourceConfig) -> Self {
        Self { client, config }
    }

    /// Build one shared client for a batch run.
    pub fn shared_client() -> Result<Client, SourceError> {
        Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SourceError::from)
    }

    async fn fetch_data<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, SourceError> {
        debug!("fetching {} from {url}", self.config.source_name);
        let response = self
            .client
            .get(url)
            .header(ACCESS_TOKEN_HEADER, &self.config.auth_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: VendorResponse<T> = serde_json::from_slice(&body)
            .map_err(|err| SourceError::Malformed(err.to_string()))?;
        Ok(parsed.data)
    }

    /// Fetch the vendor's user list, if this source exposes one.
    pub async fn fetch_users(&self) -> Result<Vec<RawUserItem>, SourceError> {
        match &self.config.users_endpoint {
            Some(url) => self.fetch_data(url).await,
            None => Ok(Vec::new()),
        }
    }

    /// Fetch per-user monthly access metrics, if this source exposes them.
    pub async fn fetch_access_metrics(&self) -> Result<Vec<RawAccessMetric>, SourceError> {
        match &self.config.metrics_endpoint {
            Some(url) => self.fetch_data(url).await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl TelemetrySource for HttpSource {
    fn name(&self) -> &str {
        &self.config.source_name
    }

    async fn fetch_sensors(&self) -> Result<Vec<RawSensorItem>, SourceError> {
        let mut items: Vec<RawSensorItem> = self.fetch_data(&self.config.endpoint).await?;
        corrections::apply(&self.config.source_name, &mut items);
        Ok(items)
    }
}
