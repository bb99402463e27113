//! # printwatch-sdk
//!
//! Emission side of printwatch: where gathered records go and how often
//! they are gathered.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use printwatch_sdk::{Accumulator, Collector, MetricRecord, Output, Poller};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Heartbeat;
//!
//! #[async_trait]
//! impl Collector for Heartbeat {
//!     async fn collect(&self, acc: &mut dyn Accumulator) {
//!         acc.add_record(MetricRecord::builder("heartbeat").field("value", 1_i64).build());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // Gather every ten seconds and print line protocol to stdout
//!     let poller = Poller::builder()
//!         .output(Output::stdout())
//!         .interval(Duration::from_secs(10))
//!         .build();
//!
//!     let handle = poller.start(Arc::new(Heartbeat));
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     handle.shutdown().await;
//! }
//! ```
//!
//! ## Features
//!
//! - **Accumulator sink**: collectors emit `(measurement, fields, tags)` without
//!   knowing the destination
//! - **Multiple outputs**: stdout, file, TCP, or custom channel
//! - **Non-overlapping cycles**: a cycle finishes before the next tick is taken

mod accumulator;
pub mod line_protocol;

#[cfg(feature = "tokio")]
mod output;
#[cfg(feature = "tokio")]
mod poller;

pub use accumulator::{Accumulator, Collector};

#[cfg(feature = "tokio")]
pub use output::Output;
#[cfg(feature = "tokio")]
pub use poller::{PollHandle, Poller, PollerBuilder};

// Re-export types for convenience
pub use printwatch_types::{Batch, FieldValue, Fields, MetricRecord, Tags};
