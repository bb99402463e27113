//! # printwatch-adapters
//!
//! Source adapters for collecting 3D printer telemetry.
//!
//! Each adapter sits behind a small capability trait so the gatherer can be
//! driven by a live printer or by a test double.
//!
//! ## Supported Sources
//!
//! - **OctoPrint** (`octoprint` feature) - connection state, tool temperatures
//!   and DisplayLayerProgress counters via the REST API ([`PrinterApi`])
//! - **FilamentManager** (`filament` feature) - selected spool and material
//!   profiles from the plugin's PostgreSQL database ([`FilamentStore`])
//!
//! ## Quick Start (OctoPrint)
//!
//! ```rust,no_run
//! use printwatch_adapters::octoprint::OctoPrintClient;
//! use printwatch_adapters::PrinterApi;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OctoPrintClient::builder()
//!         .endpoint("http://octopi.local")
//!         .api_key("0123456789ABCDEF")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let state = client.connection_state().await?;
//!     println!("Printer is {}", state);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

pub mod error;

#[cfg(feature = "octoprint")]
pub mod octoprint;

#[cfg(feature = "filament")]
pub mod filament;

pub use error::AdapterError;

// Re-export types for convenience
pub use printwatch_types::{
    ConnectionState, FilamentProfile, LayerProgress, SelectedSpool, Tool,
};

mod responses;
pub use responses::{FullState, LayerCounters, TemperatureData};

/// Requests against the printer controller.
#[async_trait]
pub trait PrinterApi: Send + Sync {
    /// Current connection/print state, e.g. "Operational".
    async fn connection_state(&self) -> Result<ConnectionState, AdapterError>;

    /// Full printer state including per-tool temperatures.
    async fn full_state(&self) -> Result<FullState, AdapterError>;

    /// Raw layer counters from the DisplayLayerProgress plugin.
    async fn layer_progress(&self) -> Result<LayerCounters, AdapterError>;
}

/// Reads filament usage records.
#[async_trait]
pub trait FilamentStore: Send + Sync {
    /// The spool currently selected in FilamentManager.
    ///
    /// Fails with [`AdapterError::NotFound`] when no spool is selected.
    async fn selected_spool(&self) -> Result<SelectedSpool, AdapterError>;

    /// All known material profiles. An empty list is valid.
    async fn profiles(&self) -> Result<Vec<FilamentProfile>, AdapterError>;
}
