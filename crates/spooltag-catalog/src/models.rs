//! Catalog entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spooltag_core::types::{MaterialRecord, MaterialType, TemperatureRange};
use uuid::Uuid;

/// A named filament profile in the catalog.
///
/// Profiles come in two flavors: stock entries shipped with the
/// application, and custom entries created by the user or registered
/// automatically from a scanned tag. Only custom entries are exported by
/// [`InMemoryCatalog::export_custom`](crate::InMemoryCatalog::export_custom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub material_type: MaterialType,
    pub sku: String,
    pub temperatures: TemperatureRange,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
}

impl MaterialProfile {
    /// A stock profile, as shipped in the default catalog.
    #[must_use]
    pub fn stock(
        name: impl Into<String>,
        brand: impl Into<String>,
        material_type: MaterialType,
        sku: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            material_type,
            sku: sku.into(),
            temperatures: material_type.default_temperatures(),
            is_custom: false,
            created_at: Utc::now(),
        }
    }

    /// A custom profile derived from a record read off a tag.
    ///
    /// Marked custom so the user can delete it later.
    #[must_use]
    pub fn from_record(record: &MaterialRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: record.display_name(),
            brand: record.brand.clone(),
            material_type: record.material_type,
            sku: record.sku.clone(),
            temperatures: record.temperatures,
            is_custom: true,
            created_at: Utc::now(),
        }
    }

    /// Whether this profile matches a record's identity key
    /// (brand, material type, SKU).
    #[must_use]
    pub fn matches(&self, brand: &str, material_type: MaterialType, sku: &str) -> bool {
        self.brand == brand && self.material_type == material_type && self.sku == sku
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spooltag_core::MaterialRecord;

    #[test]
    fn stock_profile_uses_material_defaults() {
        let profile =
            MaterialProfile::stock("Generic ABS", "Generic", MaterialType::Abs, "");
        assert!(!profile.is_custom);
        assert_eq!(
            profile.temperatures,
            MaterialType::Abs.default_temperatures()
        );
    }

    #[test]
    fn profile_from_record_is_custom_and_named() {
        let record = MaterialRecord::new(MaterialType::Tpu, "Overture", "OV-TPU");
        let profile = MaterialProfile::from_record(&record);
        assert!(profile.is_custom);
        assert_eq!(profile.name, "Overture TPU OV-TPU");
        assert!(profile.matches("Overture", MaterialType::Tpu, "OV-TPU"));
    }

    #[test]
    fn matching_is_exact_on_all_three_keys() {
        let profile =
            MaterialProfile::stock("Anycubic PLA", "Anycubic", MaterialType::Pla, "AHPLA-001");
        assert!(profile.matches("Anycubic", MaterialType::Pla, "AHPLA-001"));
        assert!(!profile.matches("Anycubic", MaterialType::Pla, ""));
        assert!(!profile.matches("Anycubic", MaterialType::PlaPlus, "AHPLA-001"));
        assert!(!profile.matches("eSUN", MaterialType::Pla, "AHPLA-001"));
    }
}
