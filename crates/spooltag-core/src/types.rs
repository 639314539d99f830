//! Domain types for filament spool tags.

use crate::{
    Result,
    constants::{MAX_UID_LEN, MIN_UID_LEN, PACK_LEN, PASSWORD_LEN},
    error::{DataError, Error},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Filament chemistry, one of the closed set understood by the printer.
///
/// The on-tag representation is the text label in a 20-byte slot, so the
/// label spellings here are load-bearing: they must match what the printer
/// firmware writes and expects, including the space in `"PLA Plus"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    Pla,
    PlaMatte,
    PlaPlus,
    PlaSilk,
    Abs,
    Petg,
    Tpu,
    Nylon,
    Asa,
    Pc,
    Pva,
    Hips,
}

impl MaterialType {
    /// Every supported material, in catalog display order.
    pub const ALL: [MaterialType; 12] = [
        MaterialType::Pla,
        MaterialType::PlaMatte,
        MaterialType::PlaPlus,
        MaterialType::PlaSilk,
        MaterialType::Abs,
        MaterialType::Petg,
        MaterialType::Tpu,
        MaterialType::Nylon,
        MaterialType::Asa,
        MaterialType::Pc,
        MaterialType::Pva,
        MaterialType::Hips,
    ];

    /// The canonical on-tag label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MaterialType::Pla => "PLA",
            MaterialType::PlaMatte => "PLA Matte",
            MaterialType::PlaPlus => "PLA Plus",
            MaterialType::PlaSilk => "PLA Silk",
            MaterialType::Abs => "ABS",
            MaterialType::Petg => "PETG",
            MaterialType::Tpu => "TPU",
            MaterialType::Nylon => "Nylon",
            MaterialType::Asa => "ASA",
            MaterialType::Pc => "PC",
            MaterialType::Pva => "PVA",
            MaterialType::Hips => "HIPS",
        }
    }

    /// Resolve a decoded label, falling back to [`MaterialType::Pla`].
    ///
    /// The label is advisory text, not the authoritative channel for any
    /// control decision, so an unrecognized spelling degrades to the default
    /// type instead of failing the whole decode.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or(MaterialType::Pla)
    }

    /// Factory-default temperature window for this chemistry.
    #[must_use]
    pub fn default_temperatures(self) -> TemperatureRange {
        match self {
            MaterialType::Pla | MaterialType::PlaMatte | MaterialType::PlaSilk => {
                TemperatureRange::new(200, 220, 50, 60)
            }
            MaterialType::PlaPlus => TemperatureRange::new(205, 225, 50, 70),
            MaterialType::Abs => TemperatureRange::new(230, 250, 80, 100),
            MaterialType::Petg => TemperatureRange::new(220, 250, 70, 80),
            MaterialType::Tpu => TemperatureRange::new(210, 230, 40, 60),
            MaterialType::Nylon => TemperatureRange::new(240, 260, 70, 90),
            MaterialType::Asa => TemperatureRange::new(240, 260, 90, 110),
            MaterialType::Pc => TemperatureRange::new(260, 280, 90, 110),
            MaterialType::Pva => TemperatureRange::new(180, 200, 45, 60),
            MaterialType::Hips => TemperatureRange::new(230, 245, 90, 110),
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Discrete spool weight bucket with a fixed length-in-meters lookup.
///
/// The tag stores the derived length, not the weight; the bucket is
/// recovered on decode by exact length match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpoolWeightClass {
    Kg0_25,
    Kg0_5,
    Kg0_75,
    Kg1,
    Kg2,
    Kg3,
    Kg5,
}

impl SpoolWeightClass {
    /// Every supported bucket, smallest first.
    pub const ALL: [SpoolWeightClass; 7] = [
        SpoolWeightClass::Kg0_25,
        SpoolWeightClass::Kg0_5,
        SpoolWeightClass::Kg0_75,
        SpoolWeightClass::Kg1,
        SpoolWeightClass::Kg2,
        SpoolWeightClass::Kg3,
        SpoolWeightClass::Kg5,
    ];

    /// Filament length on a full spool of this weight, in meters.
    #[must_use]
    pub fn length_meters(self) -> u16 {
        match self {
            SpoolWeightClass::Kg0_25 => 82,
            SpoolWeightClass::Kg0_5 => 165,
            SpoolWeightClass::Kg0_75 => 247,
            SpoolWeightClass::Kg1 => 330,
            SpoolWeightClass::Kg2 => 660,
            SpoolWeightClass::Kg3 => 990,
            SpoolWeightClass::Kg5 => 1650,
        }
    }

    /// Recover a bucket from a decoded length value.
    ///
    /// Only exact matches resolve; anything else falls back to the 1 kg
    /// bucket (documented leniency, mirroring the label fallback).
    #[must_use]
    pub fn from_length_meters(length: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|w| w.length_meters() == length)
            .unwrap_or(SpoolWeightClass::Kg1)
    }

    /// Human-readable weight, e.g. `"0.25 KG"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SpoolWeightClass::Kg0_25 => "0.25 KG",
            SpoolWeightClass::Kg0_5 => "0.5 KG",
            SpoolWeightClass::Kg0_75 => "0.75 KG",
            SpoolWeightClass::Kg1 => "1 KG",
            SpoolWeightClass::Kg2 => "2 KG",
            SpoolWeightClass::Kg3 => "3 KG",
            SpoolWeightClass::Kg5 => "5 KG",
        }
    }
}

impl fmt::Display for SpoolWeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Print temperature window in °C.
///
/// Stored on-tag as four unsigned 16-bit values. The codec enforces no
/// range validation; sanity checks are a presentation-layer concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub extruder_min: u16,
    pub extruder_max: u16,
    pub bed_min: u16,
    pub bed_max: u16,
}

impl TemperatureRange {
    #[must_use]
    pub fn new(extruder_min: u16, extruder_max: u16, bed_min: u16, bed_max: u16) -> Self {
        Self {
            extruder_min,
            extruder_max,
            bed_min,
            bed_max,
        }
    }
}

impl fmt::Display for TemperatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extruder {}-{}°C, bed {}-{}°C",
            self.extruder_min, self.extruder_max, self.bed_min, self.bed_max
        )
    }
}

/// Display color of the filament, four independent 8-bit channels.
///
/// Pure black RGB is reserved by the consuming hardware to mean "no color
/// set"; see the codec for the encode-time substitution and decode-time
/// normalization that keep black round-trip-exact at the semantic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayColor {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl DisplayColor {
    #[must_use]
    pub fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// Opaque color from RGB channels.
    #[must_use]
    pub fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self::new(0xFF, red, green, blue)
    }

    /// True if all three RGB channels are exactly zero.
    #[must_use]
    pub fn is_pure_black(&self) -> bool {
        self.red == 0 && self.green == 0 && self.blue == 0
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.alpha, self.red, self.green, self.blue
        )
    }
}

/// The domain entity written to and read from a tag.
///
/// Immutable value: constructed from a user selection or a successful
/// decode, consumed by one encode. Text fields are truncated to their
/// 20-byte tag slots on encode, never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub material_type: MaterialType,
    pub brand: String,
    pub sku: String,
    pub temperatures: TemperatureRange,
    pub color: DisplayColor,
    pub weight_class: SpoolWeightClass,
}

impl MaterialRecord {
    /// Build a record with per-material default temperatures, an opaque
    /// white color, and a 1 kg spool.
    #[must_use]
    pub fn new(
        material_type: MaterialType,
        brand: impl Into<String>,
        sku: impl Into<String>,
    ) -> Self {
        Self {
            material_type,
            brand: brand.into(),
            sku: sku.into(),
            temperatures: material_type.default_temperatures(),
            color: DisplayColor::opaque(0xFF, 0xFF, 0xFF),
            weight_class: SpoolWeightClass::Kg1,
        }
    }

    /// Set the temperature window.
    #[must_use]
    pub fn with_temperatures(mut self, temperatures: TemperatureRange) -> Self {
        self.temperatures = temperatures;
        self
    }

    /// Set the display color.
    #[must_use]
    pub fn with_color(mut self, color: DisplayColor) -> Self {
        self.color = color;
        self
    }

    /// Set the spool weight bucket.
    #[must_use]
    pub fn with_weight_class(mut self, weight_class: SpoolWeightClass) -> Self {
        self.weight_class = weight_class;
        self
    }

    /// Display name in "brand type sku" form, trimmed.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.brand, self.material_type, self.sku)
            .trim()
            .to_string()
    }
}

/// 4-byte tag password used by the PWD_AUTH exchange.
///
/// # Security
/// Comparison is constant-time to avoid leaking how much of a candidate
/// matched. `Debug` never prints the bytes.
#[derive(Clone, Copy, Eq)]
pub struct PasswordSecret([u8; PASSWORD_LEN]);

impl PasswordSecret {
    /// Factory default password on blank NTAG21x tags.
    pub const FACTORY_DEFAULT: PasswordSecret = PasswordSecret([0xFF; PASSWORD_LEN]);

    /// All-zero password, the other candidate seen in the field.
    pub const ZERO: PasswordSecret = PasswordSecret([0x00; PASSWORD_LEN]);

    #[must_use]
    pub fn new(bytes: [u8; PASSWORD_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PASSWORD_LEN] {
        &self.0
    }
}

impl PartialEq for PasswordSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for PasswordSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordSecret(****)")
    }
}

/// 2-byte password acknowledge returned by a successful PWD_AUTH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pack(pub [u8; PACK_LEN]);

impl fmt::Display for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.0[0], self.0[1])
    }
}

/// Tag unique identifier (4-10 bytes per ISO 14443).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagUid(Vec<u8>);

impl TagUid {
    /// Create a UID with length validation.
    ///
    /// # Errors
    /// Returns `DataError::Malformed` if the length is outside 4-10 bytes.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        if !(MIN_UID_LEN..=MAX_UID_LEN).contains(&len) {
            return Err(Error::Data(DataError::malformed(format!(
                "UID must be {MIN_UID_LEN}-{MAX_UID_LEN} bytes, got {len}"
            ))));
        }
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Colon-separated uppercase hex, e.g. `"04:AB:CD:EF:01:02:03"`.
    #[must_use]
    pub fn hex(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// NTAG21x variant, distinguished by memory capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TagModel {
    /// 180 bytes, 45 pages. No dynamic lock bytes in the page range this
    /// crate touches.
    Ntag213,
    /// 540 bytes, 135 pages. The variant the filament ecosystem ships.
    Ntag215,
    /// 924 bytes, 231 pages.
    Ntag216,
    /// Responded to ISO 14443 but capacity is unrecognized.
    Unknown,
}

impl TagModel {
    /// Total addressable pages including configuration pages.
    #[must_use]
    pub fn total_pages(self) -> u8 {
        match self {
            TagModel::Ntag213 => 45,
            TagModel::Ntag215 => 135,
            TagModel::Ntag216 => 231,
            TagModel::Unknown => 45,
        }
    }

    /// Whether the variant has dynamic lock bytes at page 40.
    #[must_use]
    pub fn has_dynamic_lock(self) -> bool {
        matches!(self, TagModel::Ntag215 | TagModel::Ntag216)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TagModel::Ntag213 => "NTAG213",
            TagModel::Ntag215 => "NTAG215",
            TagModel::Ntag216 => "NTAG216",
            TagModel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TagModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result of the initial identity exchange with a detected tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagIdentity {
    pub uid: TagUid,
    pub model: TagModel,
    pub detected_at: DateTime<Utc>,
}

impl TagIdentity {
    #[must_use]
    pub fn new(uid: TagUid, model: TagModel) -> Self {
        Self {
            uid,
            model,
            detected_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PLA", MaterialType::Pla)]
    #[case("PLA Plus", MaterialType::PlaPlus)]
    #[case("PETG", MaterialType::Petg)]
    #[case("HIPS", MaterialType::Hips)]
    fn material_label_roundtrip(#[case] label: &str, #[case] expected: MaterialType) {
        assert_eq!(MaterialType::from_label(label), expected);
        assert_eq!(expected.label(), label);
    }

    #[test]
    fn unknown_material_label_falls_back_to_pla() {
        assert_eq!(MaterialType::from_label("Carbon Fiber"), MaterialType::Pla);
        assert_eq!(MaterialType::from_label(""), MaterialType::Pla);
    }

    #[rstest]
    #[case(SpoolWeightClass::Kg0_25, 82)]
    #[case(SpoolWeightClass::Kg1, 330)]
    #[case(SpoolWeightClass::Kg5, 1650)]
    fn weight_class_length_lookup(#[case] class: SpoolWeightClass, #[case] meters: u16) {
        assert_eq!(class.length_meters(), meters);
        assert_eq!(SpoolWeightClass::from_length_meters(meters), class);
    }

    #[test]
    fn unknown_length_falls_back_to_one_kg() {
        assert_eq!(
            SpoolWeightClass::from_length_meters(123),
            SpoolWeightClass::Kg1
        );
        assert_eq!(
            SpoolWeightClass::from_length_meters(0),
            SpoolWeightClass::Kg1
        );
    }

    #[test]
    fn default_temperatures_per_material() {
        let pla = MaterialType::Pla.default_temperatures();
        assert_eq!(pla, TemperatureRange::new(200, 220, 50, 60));

        let pc = MaterialType::Pc.default_temperatures();
        assert_eq!(pc.extruder_max, 280);
    }

    #[test]
    fn record_builder_defaults() {
        let record = MaterialRecord::new(MaterialType::Petg, "Generic", "");
        assert_eq!(record.temperatures, MaterialType::Petg.default_temperatures());
        assert_eq!(record.weight_class, SpoolWeightClass::Kg1);
        assert_eq!(record.display_name(), "Generic PETG");
    }

    #[test]
    fn record_display_name_trims_empty_sku() {
        let record = MaterialRecord::new(MaterialType::Pla, "Anycubic", "AHPLA-001");
        assert_eq!(record.display_name(), "Anycubic PLA AHPLA-001");
    }

    #[test]
    fn password_secret_constant_time_eq_and_redacted_debug() {
        let a = PasswordSecret::new([1, 2, 3, 4]);
        let b = PasswordSecret::new([1, 2, 3, 4]);
        let c = PasswordSecret::FACTORY_DEFAULT;
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(format!("{a:?}"), "PasswordSecret(****)");
    }

    #[test]
    fn tag_uid_validation_and_hex() {
        let uid = TagUid::new(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
        assert_eq!(uid.hex(), "04:AB:CD:EF");

        assert!(TagUid::new(vec![0x01, 0x02]).is_err());
        assert!(TagUid::new(vec![0x01; 11]).is_err());
        assert!(TagUid::new(vec![0x01; 10]).is_ok());
    }

    #[test]
    fn tag_model_capacities() {
        assert_eq!(TagModel::Ntag213.total_pages(), 45);
        assert_eq!(TagModel::Ntag215.total_pages(), 135);
        assert!(!TagModel::Ntag213.has_dynamic_lock());
        assert!(TagModel::Ntag215.has_dynamic_lock());
        assert_eq!(TagModel::Ntag216.name(), "NTAG216");
    }

    #[test]
    fn color_black_detection() {
        assert!(DisplayColor::opaque(0, 0, 0).is_pure_black());
        assert!(!DisplayColor::opaque(1, 0, 0).is_pure_black());
    }

    #[test]
    fn material_type_serialization() {
        let json = serde_json::to_string(&MaterialType::PlaPlus).unwrap();
        let back: MaterialType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MaterialType::PlaPlus);
    }
}
