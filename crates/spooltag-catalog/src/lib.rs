//! Filament profile catalog: the collaborator that resolves tag contents
//! back to known profiles.
//!
//! The session engine hands a decoded
//! [`MaterialRecord`](spooltag_core::MaterialRecord) upward; this crate
//! answers "which profile is that?". Resolution is keyed on
//! (brand, material type, SKU). A record that matches nothing becomes a new
//! custom profile, registered exactly once, so a spool scanned on two
//! devices converges to the same catalog entry.
//!
//! The [`ProfileResolver`] trait is the seam: the in-memory implementation
//! here covers tests, the demo CLI, and embedding applications that bring
//! their own persistence around it (custom profiles export/import as JSON).

pub mod catalog;
pub mod models;
pub mod resolver;

pub use catalog::InMemoryCatalog;
pub use models::MaterialProfile;
pub use resolver::ProfileResolver;
