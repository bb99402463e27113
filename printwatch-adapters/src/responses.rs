//! Response shapes returned by [`PrinterApi`](crate::PrinterApi).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use printwatch_types::{LayerProgress, Tool};

use crate::AdapterError;

/// Temperature pair of one heating element.
///
/// OctoPrint reports `null` for elements that are not connected yet; those
/// read as 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct TemperatureData {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub actual: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub target: f64,
}

impl TemperatureData {
    pub fn new(actual: f64, target: f64) -> Self {
        Self { actual, target }
    }
}

/// The parts of the full printer state that printwatch reads.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FullState {
    /// Temperatures keyed by tool name. May be empty.
    #[serde(default)]
    pub temperature: BTreeMap<String, TemperatureData>,
}

impl FullState {
    /// Build a state from `(name, actual, target)` triples.
    pub fn from_tools<'a>(tools: impl IntoIterator<Item = (&'a str, f64, f64)>) -> Self {
        Self {
            temperature: tools
                .into_iter()
                .map(|(name, actual, target)| (name.to_string(), TemperatureData::new(actual, target)))
                .collect(),
        }
    }

    /// One `Tool` per temperature entry, ordered by name.
    pub fn tools(&self) -> Vec<Tool> {
        self.temperature
            .iter()
            .map(|(name, t)| Tool::new(name.as_str(), t.actual, t.target))
            .collect()
    }
}

/// Layer counters as the DisplayLayerProgress plugin reports them.
///
/// Both values are strings upstream and hold `"-"` while idle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LayerCounters {
    #[serde(deserialize_with = "string_or_number")]
    pub current: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total: String,
}

impl LayerCounters {
    pub fn new(current: impl Into<String>, total: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            total: total.into(),
        }
    }

    /// Normalize into numeric progress.
    pub fn parse(&self) -> Result<LayerProgress, AdapterError> {
        Ok(LayerProgress::parse(&self.current, &self.total)?)
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCounter {
    Text(String),
    Number(u64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawCounter::deserialize(deserializer)? {
        RawCounter::Text(s) => s,
        RawCounter::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_follow_temperature_map() {
        let state = FullState::from_tools([("tool0", 200.0, 200.0)]);
        let tools = state.tools();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0], Tool::new("tool0", 200.0, 200.0));
    }

    #[test]
    fn tools_are_ordered_by_name() {
        let state = FullState::from_tools([
            ("tool1", 180.0, 190.0),
            ("bed", 60.0, 60.0),
            ("tool0", 210.5, 215.0),
        ]);
        let names: Vec<String> = state.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["bed", "tool0", "tool1"]);
    }

    #[test]
    fn empty_state_has_no_tools() {
        assert!(FullState::default().tools().is_empty());
    }

    #[test]
    fn counters_parse_through_layer_progress() {
        assert_eq!(
            LayerCounters::new("-", "-").parse().unwrap(),
            LayerProgress { current: 0, total: 0 }
        );
        assert_eq!(
            LayerCounters::new("5", "20").parse().unwrap(),
            LayerProgress { current: 5, total: 20 }
        );
        assert!(matches!(
            LayerCounters::new("abc", "20").parse(),
            Err(AdapterError::Decode(_))
        ));
    }
}
