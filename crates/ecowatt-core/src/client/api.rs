//! HTTP client for the EcoWatt Cloud REST API.
//!
//! ```no_run
//! use std::time::Duration;
//! use ecowatt_core::client::CloudClient;
//! use ecowatt_core::protocol::query::RangeQuery;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CloudClient::new("http://127.0.0.1:5000", Duration::from_secs(10))?;
//! let total = client.record_count(&RangeQuery::new()).await?;
//! println!("{} records stored", total);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::protocol::endpoints;
use crate::protocol::query::RangeQuery;
use crate::protocol::response::{
    error_message, parse_body, CommandsResponse, ConfigResponse, CountResponse, DataResponse,
    StatusEnvelope,
};
use crate::types::{Command, ConfigUpdate, DeviceConfig, Record, RegisterReading, RegisterSnapshot};

/// Base URL of a backend running on the same machine.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Client for the cloud backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CloudClient {
    pub(crate) client: Client,
    base_url: String,
}

impl CloudClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Request)?;
        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    // ==================== Configuration ====================

    /// Fetch the device configuration.
    pub async fn config(&self) -> Result<DeviceConfig, ApiError> {
        let resp: ConfigResponse = self.get_json(endpoints::CONFIG, &[]).await?;
        resp.envelope
            .ensure_success(endpoints::CONFIG, "Failed to fetch configuration")?;
        resp.config.ok_or_else(|| ApiError::InvalidResponse {
            endpoint: endpoints::CONFIG.to_string(),
            message: "Response has no config".to_string(),
        })
    }

    /// Push register flags and polling interval.
    pub async fn update_config(&self, update: &ConfigUpdate) -> Result<(), ApiError> {
        let resp: StatusEnvelope = self.post_json(endpoints::CONFIG, update).await?;
        resp.ensure_success(endpoints::CONFIG, "Failed to update configuration")
    }

    // ==================== Data ====================

    /// Latest value of every register.
    pub async fn latest_registers(&self) -> Result<RegisterSnapshot, ApiError> {
        let resp: DataResponse<RegisterReading> = self.get_json(endpoints::DATA, &[]).await?;
        resp.envelope
            .ensure_success(endpoints::DATA, "Failed to fetch register values")?;
        Ok(RegisterSnapshot::from_readings(&resp.data))
    }

    /// Records matching `query`, in backend order.
    pub async fn records(&self, query: &RangeQuery) -> Result<Vec<Record>, ApiError> {
        self.fetch_records(&query.params()).await
    }

    /// One limit/offset slice of the records matching `query`.
    pub async fn records_page(
        &self,
        query: &RangeQuery,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Record>, ApiError> {
        self.fetch_records(&query.paged_params(limit, offset)).await
    }

    /// Number of records matching `query` (all records for an empty query).
    pub async fn record_count(&self, query: &RangeQuery) -> Result<u64, ApiError> {
        let resp: CountResponse = self
            .get_json(endpoints::DATA_COUNT, &query.params())
            .await?;
        resp.into_count(endpoints::DATA_COUNT)
    }

    async fn fetch_records(&self, params: &[(&str, String)]) -> Result<Vec<Record>, ApiError> {
        let resp: DataResponse<Record> = self.get_json(endpoints::DATA, params).await?;
        resp.envelope
            .ensure_success(endpoints::DATA, "Failed to fetch data")?;
        Ok(resp.data)
    }

    // ==================== Commands ====================

    /// The full command queue.
    pub async fn commands(&self) -> Result<Vec<Command>, ApiError> {
        let resp: CommandsResponse = self.get_json(endpoints::COMMANDS, &[]).await?;
        Ok(resp.into_commands())
    }

    /// Append a command to the queue. Returns the server's message, if any.
    pub async fn enqueue_command(&self, command: &Command) -> Result<Option<String>, ApiError> {
        let resp: StatusEnvelope = self.post_json(endpoints::COMMANDS, command).await?;
        resp.ensure_success(endpoints::COMMANDS, "Failed to queue command")?;
        Ok(resp.message)
    }

    // ==================== Internal HTTP helpers ====================

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        tracing::debug!(method = "GET", %url, ?params, "request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        self.handle_response(endpoint, response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        tracing::debug!(method = "POST", %url, "request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        self.handle_response(endpoint, response).await
    }

    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.map_err(ApiError::Request)?;

        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "request failed");
            return Err(ApiError::Http {
                url,
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        parse_body(endpoint, &body)
    }
}

/// Trim trailing slashes and require an http(s) scheme.
pub fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ApiError::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }

    Ok(base_url)
}
