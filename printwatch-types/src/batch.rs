//! Batch - all records produced by one gather cycle.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{Fields, MetricRecord, Tags, SCHEMA_VERSION};

/// Schema version information embedded in batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    /// Breaking changes increment this.
    pub major: u32,

    /// Backwards-compatible additions increment this.
    pub minor: u32,
}

impl SchemaVersion {
    /// The schema version produced by this library.
    pub const fn current() -> Self {
        Self {
            major: SCHEMA_VERSION,
            minor: 0,
        }
    }

    /// True if the major version matches this library's.
    pub fn is_compatible(&self) -> bool {
        self.major == SCHEMA_VERSION
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}

/// The records emitted by one gather cycle, in emission order.
///
/// The timestamp belongs to the batch rather than to each record: every
/// record in a cycle describes the same instant, and keeping records free of
/// timestamps makes two cycles over unchanged upstream state compare equal.
///
/// # Example
///
/// ```rust
/// use printwatch_types::{Batch, MetricRecord};
///
/// let mut batch = Batch::with_timestamp(1703160000000);
/// batch.push(MetricRecord::builder("state").field("value", "Printing").build());
///
/// assert_eq!(batch.len(), 1);
/// assert!(batch.version.is_compatible());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Batch {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when the cycle started.
    pub timestamp_ms: u64,

    /// Records in emission order.
    pub records: Vec<MetricRecord>,
}

impl Batch {
    /// Create an empty batch stamped with the current time.
    #[cfg(feature = "std")]
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    /// Create an empty batch with a specific timestamp.
    pub fn with_timestamp(timestamp_ms: u64) -> Self {
        Self {
            version: SchemaVersion::current(),
            timestamp_ms,
            records: Vec::new(),
        }
    }

    /// Append a record.
    pub fn push(&mut self, record: MetricRecord) {
        self.records.push(record);
    }

    /// Append a record from its parts.
    pub fn add_fields(&mut self, measurement: impl Into<String>, fields: Fields, tags: Tags) {
        self.records.push(MetricRecord::new(measurement, fields, tags));
    }

    /// Check if the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate over all records.
    pub fn iter(&self) -> impl Iterator<Item = &MetricRecord> {
        self.records.iter()
    }

    /// Iterate over the records of one measurement.
    pub fn measurement<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MetricRecord> {
        self.records.iter().filter(move |r| r.measurement == name)
    }
}

#[cfg(feature = "std")]
impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;

    fn state(value: &str) -> MetricRecord {
        MetricRecord::builder("state")
            .field("value", value)
            .tag("id", "State")
            .build()
    }

    #[test]
    fn push_preserves_emission_order() {
        let mut batch = Batch::with_timestamp(1);
        batch.push(state("Printing"));
        batch.push(MetricRecord::builder("tool").field("name", "tool0").build());
        batch.push(MetricRecord::builder("tool").field("name", "bed").build());

        let names: Vec<&str> = batch.iter().map(|r| r.measurement.as_str()).collect();
        assert_eq!(names, ["state", "tool", "tool"]);
        assert_eq!(batch.measurement("tool").count(), 2);
        assert_eq!(batch.measurement("filament").count(), 0);
    }

    #[test]
    fn add_fields_builds_record_from_parts() {
        let mut batch = Batch::with_timestamp(1);
        let mut fields = BTreeMap::new();
        fields.insert("value".into(), "Closed".into());
        let mut tags = BTreeMap::new();
        tags.insert("id".into(), "State".into());

        batch.add_fields("state", fields, tags);

        assert_eq!(batch.records[0], state("Closed"));
    }

    #[test]
    fn new_batch_is_empty_and_versioned() {
        let batch = Batch::with_timestamp(1703160000000);
        assert!(batch.is_empty());
        assert_eq!(batch.timestamp_ms, 1703160000000);
        assert!(batch.version.is_compatible());
        assert_eq!(batch.version, SchemaVersion::default());
    }

    #[test]
    fn incompatible_major_version() {
        let v = SchemaVersion {
            major: SCHEMA_VERSION + 1,
            minor: 0,
        };
        assert!(!v.is_compatible());
    }

    #[cfg(feature = "std")]
    #[test]
    fn new_batch_uses_wall_clock() {
        let batch = Batch::new();
        assert!(batch.timestamp_ms > 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let mut batch = Batch::with_timestamp(1703160000000);
        batch.push(state("Operational"));

        let json = serde_json::to_string(&batch).unwrap();
        let parsed: Batch = serde_json::from_str(&json).unwrap();

        assert_eq!(batch, parsed);
    }
}
