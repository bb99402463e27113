//! # printwatch-types
//!
//! Core types for 3D printer telemetry. This crate defines the records that
//! printwatch produces on every gather cycle, plus the small printer and
//! filament models the sources decode into.
//!
//! ## Features
//!
//! - `std` (default): Standard library support (wall-clock timestamps)
//! - `serde`: JSON serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use printwatch_types::{Batch, MetricRecord, measurement, tag};
//!
//! let mut batch = Batch::with_timestamp(1703160000000);
//! batch.push(
//!     MetricRecord::builder(measurement::TOOL)
//!         .field("name", "tool0")
//!         .field("actualTemp", 214.8)
//!         .field("targetTemp", 215.0)
//!         .tag(tag::NAME, "tool0")
//!         .build(),
//! );
//!
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch.measurement(measurement::TOOL).count(), 1);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**. It is embedded in every [`Batch`] so
//! consumers of the JSON output can detect format changes.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod batch;
mod filament;
mod printer;
mod record;

pub use batch::*;
pub use filament::*;
pub use printer::*;
pub use record::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the batch format.
pub const SCHEMA_VERSION: u32 = 1;

/// Measurement names emitted by the gatherer.
pub mod measurement {
    /// Connection state of the printer.
    pub const STATE: &str = "state";
    /// One record per heating element.
    pub const TOOL: &str = "tool";
    /// Layer counters reported by the DisplayLayerProgress plugin.
    pub const LAYER_PROGRESS: &str = "layer progress";
    /// Selected spool and material profiles from FilamentManager.
    pub const FILAMENT: &str = "filament";
}

/// Tag keys and fixed tag values.
pub mod tag {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const LAYERS: &str = "layers";

    /// Value of the `id` tag on `state` records.
    pub const STATE_ID: &str = "State";
    /// Value of the `layers` tag on `layer progress` records.
    pub const ACTIVE_LAYERS: &str = "active layers";
    /// Value of the `id` tag on filament profile records.
    pub const PROFILES_ID: &str = "FilamentManagerProfiles";
}
