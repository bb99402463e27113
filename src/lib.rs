//! # printwatch
//!
//! Collects telemetry from an OctoPrint-driven 3D printer and, optionally,
//! spool usage from the FilamentManager database, and emits it as metric
//! records on a fixed interval.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          printwatch                          │
//! │  ┌──────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐ │
//! │  │ settings │───▶│  gather  │───▶│ Poller  │───▶│ Outputs  │ │
//! │  │ (config) │    │(Gatherer)│    │  (sdk)  │    │stdout/…  │ │
//! │  └──────────┘    └────┬─────┘    └─────────┘    └──────────┘ │
//! │                       │                                      │
//! │                       ▼                                      │
//! │            PrinterApi  │  FilamentStore  (adapters)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: layered configuration (defaults, TOML file,
//!   `PRINTWATCH_*` environment, command-line overrides)
//! - **[`gather`]**: the [`Gatherer`], which runs one cycle over every source
//!   and isolates each source's failures
//! - **[`logging`]**: tracing subscriber setup for the binary
//! - **[`duration`]**: parsing of durations such as `"500ms"` or `"1.5m"`
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Print an annotated configuration file
//! printwatch --sample-config > printwatch.toml
//!
//! # Poll every 10 seconds, writing line protocol to stdout
//! printwatch --config printwatch.toml
//!
//! # One cycle against a printer given on the command line
//! printwatch --url http://octopi.local --api-key 0123456789ABCDEF --once
//! ```
//!
//! ### As a library
//!
//! ```rust,no_run
//! use printwatch::{Gatherer, Overrides, Settings};
//! use printwatch_sdk::Batch;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load(None, &Overrides {
//!         url: Some("http://octopi.local".into()),
//!         ..Default::default()
//!     })?;
//!     let gatherer = Gatherer::from_settings(&settings).await?;
//!
//!     let mut batch = Batch::new();
//!     let report = gatherer.gather(&mut batch).await;
//!     println!("{} records, {} failed sources", report.emitted, report.failures);
//!     Ok(())
//! }
//! ```

pub mod duration;
pub mod gather;
pub mod logging;
pub mod settings;

pub use gather::{CycleReport, Gatherer};
pub use settings::{Overrides, Settings, SettingsError};
