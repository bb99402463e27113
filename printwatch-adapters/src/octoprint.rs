//! OctoPrint adapter using the REST API.
//!
//! Every request is authenticated with the API key as a bearer token.
//!
//! ## Endpoints Used
//!
//! - `GET /api/connection` - connection state ("Operational", "Printing", ...)
//! - `GET /api/printer` - full printer state with tool temperatures
//! - `GET /plugin/DisplayLayerProgress/values` - layer counters, only present
//!   when the DisplayLayerProgress plugin is installed
//!
//! ## Example
//!
//! ```rust,no_run
//! use printwatch_adapters::octoprint::OctoPrintClient;
//! use printwatch_adapters::PrinterApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OctoPrintClient::builder()
//!         .endpoint("http://octopi.local")
//!         .api_key("0123456789ABCDEF")
//!         .build()?;
//!
//!     for tool in client.full_state().await?.tools() {
//!         println!("{}: {:.1} / {:.1}", tool.name, tool.actual, tool.target);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use printwatch_types::ConnectionState;

use crate::{AdapterError, FullState, LayerCounters, PrinterApi};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECTION_PATH: &str = "/api/connection";
const PRINTER_PATH: &str = "/api/printer";
const LAYER_PROGRESS_PATH: &str = "/plugin/DisplayLayerProgress/values";

/// OctoPrint REST client.
///
/// Holds nothing but the base URL, the key and a pooled HTTP client, so it is
/// built once and reused across gather cycles.
#[derive(Debug, Clone)]
pub struct OctoPrintClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OctoPrintClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> OctoPrintClientBuilder {
        OctoPrintClientBuilder::default()
    }

    /// Base URL requests are issued against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdapterError> {
        let url = format!("{}{}", self.endpoint, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AdapterError::Transport(format!(
                "{} rejected the API key ({})",
                path, status
            )));
        }

        if !status.is_success() {
            return Err(AdapterError::Transport(format!(
                "{} returned status {}",
                path, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl PrinterApi for OctoPrintClient {
    async fn connection_state(&self) -> Result<ConnectionState, AdapterError> {
        let response: ConnectionResponse = self.get_json(CONNECTION_PATH).await?;
        Ok(ConnectionState(response.current.state))
    }

    async fn full_state(&self) -> Result<FullState, AdapterError> {
        self.get_json(PRINTER_PATH).await
    }

    async fn layer_progress(&self) -> Result<LayerCounters, AdapterError> {
        let response: LayerProgressResponse = self.get_json(LAYER_PROGRESS_PATH).await?;
        Ok(response.layer)
    }
}

/// Builder for OctoPrintClient.
#[derive(Debug, Default)]
pub struct OctoPrintClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl OctoPrintClientBuilder {
    /// Set the OctoPrint base URL (e.g., "http://octopi.local").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key sent as a bearer token.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<OctoPrintClient, AdapterError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Transport(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:5000".to_string());

        Ok(OctoPrintClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: self.api_key.unwrap_or_default(),
        })
    }
}

/// Body of `GET /api/connection`.
#[derive(Debug, Deserialize)]
struct ConnectionResponse {
    current: CurrentConnection,
}

#[derive(Debug, Deserialize)]
struct CurrentConnection {
    state: String,
}

/// Body of `GET /plugin/DisplayLayerProgress/values`.
#[derive(Debug, Deserialize)]
struct LayerProgressResponse {
    layer: LayerCounters,
}
