//! InfluxDB line protocol rendering.
//!
//! One line per record:
//!
//! ```text
//! tool,name=tool0 actualTemp=214.8,name="tool0",targetTemp=220 1703160000000000000
//! ```
//!
//! Tags and fields are written in key order. Integers carry the `i` suffix,
//! strings are double-quoted, and the timestamp is the batch timestamp in
//! nanoseconds.
//!
//! ## Example
//!
//! ```rust
//! use printwatch_sdk::line_protocol;
//! use printwatch_sdk::{Batch, MetricRecord};
//!
//! let mut batch = Batch::with_timestamp(1703160000000);
//! batch.push(
//!     MetricRecord::builder("layer progress")
//!         .field("current_layer", 5_i64)
//!         .field("total_layer", 20_i64)
//!         .tag("layers", "active layers")
//!         .build(),
//! );
//!
//! assert_eq!(
//!     line_protocol::render(&batch),
//!     "layer\\ progress,layers=active\\ layers current_layer=5i,total_layer=20i 1703160000000000000\n"
//! );
//! ```

use std::fmt::Write;

use printwatch_types::{Batch, FieldValue, MetricRecord};

/// Render every record of a batch, one line each.
pub fn render(batch: &Batch) -> String {
    let timestamp_ns = batch.timestamp_ms.saturating_mul(1_000_000);
    let mut output = String::new();

    for record in &batch.records {
        if let Some(line) = render_record(record, Some(timestamp_ns)) {
            output.push_str(&line);
            output.push('\n');
        }
    }

    output
}

/// Render a single record without a trailing newline.
///
/// Returns `None` if the record has no representable fields; line protocol
/// requires at least one.
pub fn render_record(record: &MetricRecord, timestamp_ns: Option<u64>) -> Option<String> {
    let mut fields = String::new();
    for (key, value) in &record.fields {
        let Some(value) = format_field_value(value) else {
            continue;
        };
        if !fields.is_empty() {
            fields.push(',');
        }
        fields.push_str(&escape_key(key));
        fields.push('=');
        fields.push_str(&value);
    }

    if fields.is_empty() {
        return None;
    }

    let mut line = escape_measurement(&record.measurement);
    for (key, value) in &record.tags {
        // Empty tag values are not allowed
        if value.is_empty() {
            continue;
        }
        let _ = write!(line, ",{}={}", escape_key(key), escape_key(value));
    }

    line.push(' ');
    line.push_str(&fields);

    if let Some(ts) = timestamp_ns {
        let _ = write!(line, " {}", ts);
    }

    Some(line)
}

fn format_field_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Int(v) => Some(format!("{}i", v)),
        FieldValue::Float(v) if v.is_finite() => Some(format!("{}", v)),
        FieldValue::Float(_) => None,
        FieldValue::Bool(v) => Some(v.to_string()),
        FieldValue::Str(v) => Some(format!("\"{}\"", escape_string(v))),
    }
}

/// Measurement names escape commas and spaces.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys, tag values and field keys escape commas, equals signs and spaces.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// String field values escape backslashes and double quotes.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_batch() -> Batch {
        let mut batch = Batch::with_timestamp(1703160000000);
        batch.push(
            MetricRecord::builder("state")
                .field("value", "Operational")
                .tag("id", "State")
                .build(),
        );
        batch.push(
            MetricRecord::builder("tool")
                .field("name", "tool0")
                .field("actualTemp", 214.8)
                .field("targetTemp", 220.0)
                .tag("name", "tool0")
                .build(),
        );
        batch
    }

    #[test]
    fn test_render_batch() {
        let output = render(&create_test_batch());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "state,id=State value=\"Operational\" 1703160000000000000"
        );
        assert_eq!(
            lines[1],
            "tool,name=tool0 actualTemp=214.8,name=\"tool0\",targetTemp=220 1703160000000000000"
        );
    }

    #[test]
    fn test_empty_batch_renders_nothing() {
        assert_eq!(render(&Batch::with_timestamp(1)), "");
    }

    #[test]
    fn test_integer_and_bool_fields() {
        let record = MetricRecord::builder("filament")
            .field("used", 412_i64)
            .field("active", true)
            .build();

        assert_eq!(
            render_record(&record, None).unwrap(),
            "filament active=true,used=412i"
        );
    }

    #[test]
    fn test_escaping() {
        let record = MetricRecord::builder("layer progress")
            .field("name", r#"Material: PLA Color: "Red" \ matte"#)
            .tag("id", "3_Galaxy Black")
            .tag("a=b", "c,d")
            .build();

        assert_eq!(
            render_record(&record, None).unwrap(),
            r#"layer\ progress,a\=b=c\,d,id=3_Galaxy\ Black name="Material: PLA Color: \"Red\" \\ matte""#
        );
    }

    #[test]
    fn test_non_finite_floats_are_dropped() {
        let record = MetricRecord::builder("tool")
            .field("actualTemp", f64::NAN)
            .field("targetTemp", 200.0)
            .build();
        assert_eq!(render_record(&record, None).unwrap(), "tool targetTemp=200");

        let only_nan = MetricRecord::builder("tool")
            .field("actualTemp", f64::INFINITY)
            .build();
        assert!(render_record(&only_nan, None).is_none());
    }

    #[test]
    fn test_record_without_fields_is_skipped() {
        let mut batch = Batch::with_timestamp(1);
        batch.push(MetricRecord::builder("state").tag("id", "State").build());
        assert_eq!(render(&batch), "");
    }

    #[test]
    fn test_empty_tag_value_is_omitted() {
        let record = MetricRecord::builder("tool")
            .field("targetTemp", 0.0)
            .tag("name", "")
            .build();
        assert_eq!(render_record(&record, Some(5)).unwrap(), "tool targetTemp=0 5");
    }
}
