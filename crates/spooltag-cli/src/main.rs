//! Demo driver: runs the full programming flow against a simulated tag.
//!
//! This binary is the executable end-to-end scenario: it writes a record to
//! a mock NTAG215, verifies it in a second session, reads it back, resolves
//! the decoded record against the profile catalog, and finishes with a lock
//! check against a password-protected tag to show failure classification.
//!
//! Run with `RUST_LOG=debug` to watch the page-level exchanges.

use anyhow::Result;
use spooltag_catalog::{InMemoryCatalog, ProfileResolver};
use spooltag_codec::decode;
use spooltag_core::{
    DisplayColor, MaterialRecord, MaterialType, Pack, PasswordSecret, SpoolWeightClass, TagModel,
};
use spooltag_hardware::mock::{MockConnector, MockTag};
use spooltag_session::{Programmer, SessionConfig, SessionOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let record = MaterialRecord::new(MaterialType::Pla, "Anycubic", "AHPLA-001")
        .with_color(DisplayColor::opaque(0xE0, 0x30, 0x20))
        .with_weight_class(SpoolWeightClass::Kg1);
    info!(record = %record.display_name(), "programming spool tag");

    // Healthy blank tag: write, auto-verify, read back, resolve.
    let mut programmer = Programmer::with_config(
        MockConnector::new(MockTag::blank(TagModel::Ntag215)),
        SessionConfig::default(),
    );

    let flow = programmer.write(record).await;
    println!("write:  {}", flow.write);
    if let Some(verify) = &flow.verify {
        println!("verify: {verify}");
    }

    match programmer.read().await {
        SessionOutcome::ReadOk { image } => {
            let record = decode(image.as_bytes())?;
            let mut catalog = InMemoryCatalog::with_stock_profiles();
            let profile = catalog.resolve_record(&record).await;
            println!(
                "read:   {} ({}, {})",
                profile.name, record.color, record.weight_class
            );
        }
        other => println!("read:   {other}"),
    }

    // Password-protected tag: the write fails and the engine classifies why.
    let protected = MockTag::blank(TagModel::Ntag215).password_protected(
        PasswordSecret::new([0x50, 0x4F, 0x4F, 0x4C]),
        0x04,
        Pack([0xAA, 0x55]),
    );
    let mut programmer = Programmer::new(MockConnector::new(protected));

    let flow = programmer
        .write(MaterialRecord::new(MaterialType::Petg, "Generic", ""))
        .await;
    println!("protected write: {}", flow.write);
    if let Some(err) = flow.write.error() {
        println!("remediation:     {}", err.remediation_hint());
    }

    match programmer.check_lock().await {
        SessionOutcome::LockReport(verdict) => println!("lock status:     {verdict}"),
        other => println!("lock status:     {other}"),
    }

    Ok(())
}
