//! Filament models read from the FilamentManager database.

use alloc::format;
use alloc::string::String;

use crate::{measurement, tag, MetricRecord};

/// The spool currently loaded in the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedSpool {
    pub id: i64,
    /// Spool name; FilamentManager users typically store the color here.
    pub name: String,
    /// Net filament weight in grams.
    pub weight: i64,
    /// Filament consumed so far, in grams.
    pub used: i64,
    pub vendor: String,
    pub material: String,
}

impl SelectedSpool {
    /// `"Material: <material> Color: <name>"`.
    pub fn display_name(&self) -> String {
        format!("Material: {} Color: {}", self.material, self.name)
    }

    /// `"<id>_<name>"`, the series identifier of the spool.
    pub fn tag_id(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }

    /// Render as a `filament` record.
    pub fn to_record(&self) -> MetricRecord {
        MetricRecord::builder(measurement::FILAMENT)
            .field("name", self.display_name())
            .field("used", self.used)
            .tag(tag::ID, self.tag_id())
            .build()
    }
}

/// A material profile known to FilamentManager.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilamentProfile {
    pub vendor: String,
    pub material: String,
}

impl FilamentProfile {
    /// Render as a `filament` profile record.
    pub fn to_record(&self) -> MetricRecord {
        MetricRecord::builder(measurement::FILAMENT)
            .field("vendor", self.vendor.as_str())
            .field("material", self.material.as_str())
            .tag(tag::ID, tag::PROFILES_ID)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    fn spool() -> SelectedSpool {
        SelectedSpool {
            id: 3,
            name: "Galaxy Black".into(),
            weight: 1000,
            used: 412,
            vendor: "Prusament".into(),
            material: "PLA".into(),
        }
    }

    #[test]
    fn spool_record_shape() {
        let r = spool().to_record();
        assert_eq!(r.measurement, "filament");
        assert_eq!(
            r.field("name"),
            Some(&FieldValue::from("Material: PLA Color: Galaxy Black"))
        );
        assert_eq!(r.field("used"), Some(&FieldValue::Int(412)));
        assert_eq!(r.tag("id"), Some("3_Galaxy Black"));
        assert_eq!(r.fields.len(), 2);
    }

    #[test]
    fn profile_record_shape() {
        let r = FilamentProfile {
            vendor: "Generic".into(),
            material: "PETG".into(),
        }
        .to_record();

        assert_eq!(r.measurement, "filament");
        assert_eq!(r.field("vendor"), Some(&FieldValue::from("Generic")));
        assert_eq!(r.field("material"), Some(&FieldValue::from("PETG")));
        assert_eq!(r.tag("id"), Some("FilamentManagerProfiles"));
    }
}
