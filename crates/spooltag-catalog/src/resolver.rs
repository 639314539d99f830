//! Profile resolution trait.

#![allow(async_fn_in_trait)]

use crate::models::MaterialProfile;
use spooltag_core::types::{MaterialRecord, MaterialType};

/// Resolves decoded tag records to catalog profiles.
///
/// This is the interface the presentation layer consumes after a read:
/// decode the image, then resolve the record. Implementations decide where
/// profiles live; the contract only fixes the identity key and the
/// register-on-miss behavior.
///
/// Uses native async trait methods (Edition 2024) so persistent
/// implementations can do I/O; the in-memory implementation completes
/// immediately.
pub trait ProfileResolver: Send + Sync {
    /// Find a profile by its (brand, material type, SKU) identity key.
    async fn find(
        &self,
        brand: &str,
        material_type: MaterialType,
        sku: &str,
    ) -> Option<MaterialProfile>;

    /// Add a profile to the catalog, returning the stored entry.
    async fn register(&mut self, profile: MaterialProfile) -> MaterialProfile;

    /// Resolve a decoded record: return the matching profile, updating its
    /// temperatures from the tag, or register a new custom profile when
    /// nothing matches.
    ///
    /// The tag is the source of truth for temperatures; a spool
    /// re-labelled by the vendor should win over a stale catalog entry.
    async fn resolve_record(&mut self, record: &MaterialRecord) -> MaterialProfile;
}
