//! The sink collectors emit into.

use async_trait::async_trait;

use printwatch_types::{Batch, Fields, MetricRecord, Tags};

/// Destination for metric records produced during a gather cycle.
///
/// Mirrors the `Emit(measurement, fields, tags)` shape metric agents expose
/// to their input plugins.
pub trait Accumulator: Send {
    /// Emit one record from its parts.
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags);

    /// Emit a pre-built record.
    fn add_record(&mut self, record: MetricRecord) {
        let MetricRecord {
            measurement,
            fields,
            tags,
        } = record;
        self.add_fields(&measurement, fields, tags);
    }
}

impl Accumulator for Batch {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        Batch::add_fields(self, measurement, fields, tags);
    }

    fn add_record(&mut self, record: MetricRecord) {
        self.push(record);
    }
}

impl Accumulator for Vec<MetricRecord> {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.push(MetricRecord::new(measurement, fields, tags));
    }

    fn add_record(&mut self, record: MetricRecord) {
        self.push(record);
    }
}

/// Something that produces records once per polling cycle.
///
/// Implementations must not fail the cycle: source errors are reported
/// through logging and the affected records are simply not emitted.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Run one gather cycle, emitting records into `acc`.
    async fn collect(&self, acc: &mut dyn Accumulator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn emit_state(acc: &mut dyn Accumulator) {
        let mut fields = BTreeMap::new();
        fields.insert("value".to_string(), "Printing".into());
        let mut tags = BTreeMap::new();
        tags.insert("id".to_string(), "State".to_string());
        acc.add_fields("state", fields, tags);
    }

    #[test]
    fn batch_accumulates_in_order() {
        let mut batch = Batch::with_timestamp(1);
        emit_state(&mut batch);
        batch.add_record(MetricRecord::builder("tool").field("name", "tool0").build());

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].measurement, "state");
        assert_eq!(batch.records[0].tag("id"), Some("State"));
        assert_eq!(batch.records[1].measurement, "tool");
    }

    #[test]
    fn vec_accumulates_records() {
        let mut records: Vec<MetricRecord> = Vec::new();
        emit_state(&mut records);

        assert_eq!(
            records,
            vec![MetricRecord::builder("state")
                .field("value", "Printing")
                .tag("id", "State")
                .build()]
        );
    }

    struct Fixed;

    #[async_trait]
    impl Collector for Fixed {
        async fn collect(&self, acc: &mut dyn Accumulator) {
            emit_state(acc);
        }
    }

    #[tokio::test]
    async fn collector_writes_through_dyn_accumulator() {
        let mut batch = Batch::with_timestamp(1);
        Fixed.collect(&mut batch).await;
        assert_eq!(batch.len(), 1);
    }
}
