//! In-memory catalog with the stock profile set.

use crate::models::MaterialProfile;
use crate::resolver::ProfileResolver;
use spooltag_core::types::{MaterialRecord, MaterialType};

/// In-memory profile catalog.
///
/// Starts from the stock set the product ships: the Anycubic SKUs the tags
/// were designed for, plus one generic profile per supported material.
/// Custom profiles (user-created or registered from scanned tags) can be
/// exported and re-imported as JSON so an embedding application can
/// persist them wherever it likes.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    profiles: Vec<MaterialProfile>,
}

impl InMemoryCatalog {
    /// Catalog pre-loaded with the stock profiles.
    #[must_use]
    pub fn with_stock_profiles() -> Self {
        let mut profiles = vec![
            MaterialProfile::stock("Anycubic PLA", "Anycubic", MaterialType::Pla, "AHPLA-001"),
            MaterialProfile::stock(
                "Anycubic PLA Plus",
                "Anycubic",
                MaterialType::PlaPlus,
                "AHPLLB-103",
            ),
            MaterialProfile::stock("Anycubic ABS", "Anycubic", MaterialType::Abs, "AHABS-001"),
            MaterialProfile::stock(
                "Anycubic PETG",
                "Anycubic",
                MaterialType::Petg,
                "AHPETG-001",
            ),
            MaterialProfile::stock("Anycubic TPU", "Anycubic", MaterialType::Tpu, "AHTPU-001"),
        ];
        for material_type in MaterialType::ALL {
            profiles.push(MaterialProfile::stock(
                format!("Generic {material_type}"),
                "Generic",
                material_type,
                "",
            ));
        }
        Self { profiles }
    }

    /// Empty catalog (tests, or applications that load everything).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            profiles: Vec::new(),
        }
    }

    /// All profiles, stock first, in insertion order.
    #[must_use]
    pub fn profiles(&self) -> &[MaterialProfile] {
        &self.profiles
    }

    /// Remove a custom profile by id. Stock profiles are not deletable.
    pub fn delete(&mut self, id: uuid::Uuid) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| !(p.is_custom && p.id == id));
        self.profiles.len() != before
    }

    /// Serialize the custom subset as JSON.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn export_custom(&self) -> serde_json::Result<String> {
        let custom: Vec<&MaterialProfile> =
            self.profiles.iter().filter(|p| p.is_custom).collect();
        serde_json::to_string_pretty(&custom)
    }

    /// Append previously exported custom profiles.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` on malformed input.
    pub fn import_custom(&mut self, json: &str) -> serde_json::Result<usize> {
        let custom: Vec<MaterialProfile> = serde_json::from_str(json)?;
        let count = custom.len();
        self.profiles.extend(custom);
        Ok(count)
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::with_stock_profiles()
    }
}

impl ProfileResolver for InMemoryCatalog {
    async fn find(
        &self,
        brand: &str,
        material_type: MaterialType,
        sku: &str,
    ) -> Option<MaterialProfile> {
        self.profiles
            .iter()
            .find(|p| p.matches(brand, material_type, sku))
            .cloned()
    }

    async fn register(&mut self, profile: MaterialProfile) -> MaterialProfile {
        self.profiles.push(profile.clone());
        profile
    }

    async fn resolve_record(&mut self, record: &MaterialRecord) -> MaterialProfile {
        if let Some(existing) = self
            .profiles
            .iter_mut()
            .find(|p| p.matches(&record.brand, record.material_type, &record.sku))
        {
            existing.temperatures = record.temperatures;
            return existing.clone();
        }
        self.register(MaterialProfile::from_record(record)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spooltag_core::{MaterialRecord, TemperatureRange};

    #[tokio::test]
    async fn stock_catalog_has_anycubic_and_generic_profiles() {
        let catalog = InMemoryCatalog::with_stock_profiles();
        // 5 Anycubic SKUs + 12 generic materials.
        assert_eq!(catalog.profiles().len(), 17);

        let profile = catalog
            .find("Anycubic", MaterialType::Pla, "AHPLA-001")
            .await
            .unwrap();
        assert_eq!(profile.name, "Anycubic PLA");
        assert!(!profile.is_custom);

        assert!(catalog.find("Generic", MaterialType::Hips, "").await.is_some());
    }

    #[tokio::test]
    async fn resolve_known_record_updates_temperatures_from_tag() {
        let mut catalog = InMemoryCatalog::with_stock_profiles();
        let tag_temps = TemperatureRange::new(195, 215, 45, 55);
        let record = MaterialRecord::new(MaterialType::Pla, "Anycubic", "AHPLA-001")
            .with_temperatures(tag_temps);

        let resolved = catalog.resolve_record(&record).await;
        assert!(!resolved.is_custom);
        assert_eq!(resolved.temperatures, tag_temps);

        // The update stuck in the catalog, not just the returned copy.
        let found = catalog
            .find("Anycubic", MaterialType::Pla, "AHPLA-001")
            .await
            .unwrap();
        assert_eq!(found.temperatures, tag_temps);
    }

    #[tokio::test]
    async fn resolve_unknown_record_registers_custom_profile_once() {
        let mut catalog = InMemoryCatalog::with_stock_profiles();
        let record = MaterialRecord::new(MaterialType::Asa, "Polymaker", "PM-ASA-BLK");

        let first = catalog.resolve_record(&record).await;
        assert!(first.is_custom);
        assert_eq!(catalog.profiles().len(), 18);

        let second = catalog.resolve_record(&record).await;
        assert_eq!(second.id, first.id);
        assert_eq!(catalog.profiles().len(), 18);
    }

    #[tokio::test]
    async fn custom_profiles_roundtrip_through_json() {
        let mut catalog = InMemoryCatalog::with_stock_profiles();
        let record = MaterialRecord::new(MaterialType::Petg, "eSUN", "ES-PETG");
        catalog.resolve_record(&record).await;

        let json = catalog.export_custom().unwrap();

        let mut fresh = InMemoryCatalog::with_stock_profiles();
        let imported = fresh.import_custom(&json).unwrap();
        assert_eq!(imported, 1);
        assert!(fresh.find("eSUN", MaterialType::Petg, "ES-PETG").await.is_some());
    }

    #[tokio::test]
    async fn only_custom_profiles_are_deletable() {
        let mut catalog = InMemoryCatalog::with_stock_profiles();
        let stock_id = catalog.profiles()[0].id;
        assert!(!catalog.delete(stock_id));

        let custom = catalog
            .resolve_record(&MaterialRecord::new(MaterialType::Pva, "Inland", "IN-PVA"))
            .await;
        assert!(catalog.delete(custom.id));
        assert!(catalog.find("Inland", MaterialType::Pva, "IN-PVA").await.is_none());
    }
}
