//! Metric records - the unit of emission.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// A scalar field value.
///
/// Printer telemetry mixes numbers (temperatures, layer counters) with
/// strings (connection state, tool names), so fields are not numeric-only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl FieldValue {
    /// Returns the value as an `i64` if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

/// Field set of a record, keyed by field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// Tag set of a record, keyed by tag name.
pub type Tags = BTreeMap<String, String>;

/// One metric record: a measurement name with its fields and tags.
///
/// Fields and tags are kept in `BTreeMap`s so two records built from the
/// same upstream data compare and render identically.
///
/// # Example
///
/// ```rust
/// use printwatch_types::{FieldValue, MetricRecord};
///
/// let record = MetricRecord::builder("state")
///     .field("value", "Operational")
///     .tag("id", "State")
///     .build();
///
/// assert_eq!(record.field("value"), Some(&FieldValue::from("Operational")));
/// assert_eq!(record.tag("id"), Some("State"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricRecord {
    /// Measurement (metric family) name.
    pub measurement: String,

    /// Field values.
    pub fields: Fields,

    /// Tags identifying the series.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub tags: Tags,
}

impl MetricRecord {
    /// Create a record from already-assembled field and tag sets.
    pub fn new(measurement: impl Into<String>, fields: Fields, tags: Tags) -> Self {
        Self {
            measurement: measurement.into(),
            fields,
            tags,
        }
    }

    /// Create a builder for a record under the given measurement.
    pub fn builder(measurement: impl Into<String>) -> MetricRecordBuilder {
        MetricRecordBuilder::new(measurement)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a tag by name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// Builder for `MetricRecord`.
#[derive(Debug)]
pub struct MetricRecordBuilder {
    measurement: String,
    fields: Fields,
    tags: Tags,
}

impl MetricRecordBuilder {
    /// Create a new builder.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            fields: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Set a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a tag.
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> MetricRecord {
        MetricRecord {
            measurement: self.measurement,
            fields: self.fields,
            tags: self.tags,
        }
    }
}
