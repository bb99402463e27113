//! Printer models: tools, connection state and layer progress.

use alloc::string::{String, ToString};
use core::fmt;

use crate::{measurement, tag, MetricRecord};

/// A heating element on the printer (hot end, heated bed, chamber).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tool {
    /// Identifier as reported by the controller, e.g. "tool0" or "bed".
    pub name: String,
    /// Current temperature.
    pub actual: f64,
    /// Target temperature.
    pub target: f64,
}

impl Tool {
    pub fn new(name: impl Into<String>, actual: f64, target: f64) -> Self {
        Self {
            name: name.into(),
            actual,
            target,
        }
    }

    /// Render as a `tool` record.
    pub fn to_record(&self) -> MetricRecord {
        MetricRecord::builder(measurement::TOOL)
            .field("name", self.name.as_str())
            .field("actualTemp", self.actual)
            .field("targetTemp", self.target)
            .tag(tag::NAME, self.name.as_str())
            .build()
    }
}

/// The controller's connection/print state, e.g. "Operational" or "Printing".
///
/// Kept as the raw string: the set of states depends on the controller
/// version and its plugins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ConnectionState(pub String);

impl ConnectionState {
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as a `state` record.
    pub fn to_record(&self) -> MetricRecord {
        MetricRecord::builder(measurement::STATE)
            .field("value", self.0.as_str())
            .tag(tag::ID, tag::STATE_ID)
            .build()
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marker the layer-progress plugin reports while nothing is printing.
pub const IDLE_LAYER_MARKER: &str = "-";

/// Current layer and total layer count of the active print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerProgress {
    pub current: u64,
    pub total: u64,
}

impl LayerProgress {
    /// Parse the plugin's string counters.
    ///
    /// The idle marker `"-"` reads as 0; anything else must be a
    /// non-negative integer.
    ///
    /// ```rust
    /// use printwatch_types::LayerProgress;
    ///
    /// assert_eq!(LayerProgress::parse("-", "-").unwrap(), LayerProgress { current: 0, total: 0 });
    /// assert_eq!(LayerProgress::parse("5", "20").unwrap(), LayerProgress { current: 5, total: 20 });
    /// assert!(LayerProgress::parse("abc", "20").is_err());
    /// ```
    pub fn parse(current: &str, total: &str) -> Result<Self, LayerParseError> {
        Ok(Self {
            current: parse_counter("current", current)?,
            total: parse_counter("total", total)?,
        })
    }

    /// Render as a `layer progress` record.
    pub fn to_record(&self) -> MetricRecord {
        MetricRecord::builder(measurement::LAYER_PROGRESS)
            .field("current_layer", self.current)
            .field("total_layer", self.total)
            .tag(tag::LAYERS, tag::ACTIVE_LAYERS)
            .build()
    }
}

fn parse_counter(field: &'static str, raw: &str) -> Result<u64, LayerParseError> {
    let raw = raw.trim();
    if raw == IDLE_LAYER_MARKER {
        return Ok(0);
    }
    raw.parse().map_err(|_| LayerParseError {
        field,
        value: raw.to_string(),
    })
}

/// A layer counter that is neither a number nor the idle marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerParseError {
    /// Which counter failed ("current" or "total").
    pub field: &'static str,
    /// The offending value.
    pub value: String,
}

impl fmt::Display for LayerParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} layer value {:?}", self.field, self.value)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayerParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    #[test]
    fn idle_marker_reads_as_zero() {
        let p = LayerProgress::parse("-", "-").unwrap();
        assert_eq!(p, LayerProgress { current: 0, total: 0 });
    }

    #[test]
    fn numeric_counters() {
        let p = LayerProgress::parse("5", "20").unwrap();
        assert_eq!(p, LayerProgress { current: 5, total: 20 });
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let p = LayerProgress::parse(" 7 ", "\t-").unwrap();
        assert_eq!(p, LayerProgress { current: 7, total: 0 });
    }

    #[test]
    fn garbage_counter_is_rejected() {
        let err = LayerProgress::parse("abc", "20").unwrap_err();
        assert_eq!(err.field, "current");
        assert_eq!(err.value, "abc");

        let err = LayerProgress::parse("3", "-1").unwrap_err();
        assert_eq!(err.field, "total");

        assert!(LayerProgress::parse("", "20").is_err());
        assert!(LayerProgress::parse("--", "20").is_err());
    }

    #[test]
    fn layer_record_shape() {
        let r = LayerProgress { current: 5, total: 20 }.to_record();
        assert_eq!(r.measurement, "layer progress");
        assert_eq!(r.field("current_layer"), Some(&FieldValue::Int(5)));
        assert_eq!(r.field("total_layer"), Some(&FieldValue::Int(20)));
        assert_eq!(r.tag("layers"), Some("active layers"));
    }

    #[test]
    fn tool_record_preserves_values() {
        let r = Tool::new("tool0", 200.0, 200.0).to_record();
        assert_eq!(r.measurement, "tool");
        assert_eq!(r.field("name"), Some(&FieldValue::from("tool0")));
        assert_eq!(r.field("actualTemp"), Some(&FieldValue::Float(200.0)));
        assert_eq!(r.field("targetTemp"), Some(&FieldValue::Float(200.0)));
        assert_eq!(r.tag("name"), Some("tool0"));
    }

    #[test]
    fn state_record_is_verbatim() {
        let r = ConnectionState::new("printing").to_record();
        assert_eq!(r.measurement, "state");
        assert_eq!(r.field("value"), Some(&FieldValue::from("printing")));
        assert_eq!(r.tag("id"), Some("State"));
    }
}
