//! Property-based tests for the record codec.
//!
//! These use proptest to verify the codec's total-function guarantees over
//! arbitrary inputs: encode never produces anything but 144 bytes, decode
//! never panics, and the semantic round-trip holds for every representable
//! record.

use proptest::prelude::*;
use spooltag_codec::{decode, encode};
use spooltag_core::constants::{TAG_DATA_LEN, TAG_IMAGE_LEN};
use spooltag_core::{
    DisplayColor, MaterialRecord, MaterialType, SpoolWeightClass, TemperatureRange,
};

/// Strategy for any supported material type.
fn any_material() -> impl Strategy<Value = MaterialType> {
    prop::sample::select(MaterialType::ALL.to_vec())
}

/// Strategy for any supported weight bucket.
fn any_weight_class() -> impl Strategy<Value = SpoolWeightClass> {
    prop::sample::select(SpoolWeightClass::ALL.to_vec())
}

/// Strategy for slot text that survives the trim applied on decode:
/// printable ASCII without surrounding whitespace, within the 20-byte slot.
fn slot_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("([!-~]([ -~]{0,18}[!-~])?)?")
        .expect("valid slot text regex")
}

/// Strategy for colors that are channel-exact through the codec: either
/// pure black or with at least one RGB channel above the near-black fold.
fn roundtrip_color() -> impl Strategy<Value = DisplayColor> {
    prop_oneof![
        any::<u8>().prop_map(|alpha| DisplayColor::new(alpha, 0, 0, 0)),
        (any::<u8>(), 3u8..=255, any::<u8>(), any::<u8>())
            .prop_map(|(alpha, red, green, blue)| DisplayColor::new(alpha, red, green, blue)),
    ]
}

fn any_record() -> impl Strategy<Value = MaterialRecord> {
    (
        any_material(),
        slot_text(),
        slot_text(),
        any::<(u16, u16, u16, u16)>(),
        roundtrip_color(),
        any_weight_class(),
    )
        .prop_map(|(material_type, brand, sku, temps, color, weight_class)| {
            MaterialRecord {
                material_type,
                brand,
                sku,
                temperatures: TemperatureRange::new(temps.0, temps.1, temps.2, temps.3),
                color,
                weight_class,
            }
        })
}

proptest! {
    /// Property: encode is total and always yields exactly 144 bytes, no
    /// matter how oversized the text fields are.
    #[test]
    fn encode_always_produces_full_image(
        material in any_material(),
        brand in ".{0,200}",
        sku in ".{0,200}",
    ) {
        let record = MaterialRecord::new(material, brand, sku);
        prop_assert_eq!(encode(&record).as_bytes().len(), TAG_IMAGE_LEN);
    }

    /// Property: decode never panics on arbitrary byte soup of any length.
    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..=TAG_IMAGE_LEN)) {
        let _ = decode(&bytes);
    }

    /// Property: any representable record survives the round trip at the
    /// semantic level.
    #[test]
    fn semantic_roundtrip(record in any_record()) {
        let decoded = decode(encode(&record).as_bytes()).unwrap();
        prop_assert_eq!(decoded.material_type, record.material_type);
        prop_assert_eq!(decoded.brand, record.brand);
        prop_assert_eq!(decoded.sku, record.sku);
        prop_assert_eq!(decoded.temperatures, record.temperatures);
        prop_assert_eq!(decoded.color, record.color);
        prop_assert_eq!(decoded.weight_class, record.weight_class);
    }

    /// Property: the tail past the 112-byte data prefix never influences
    /// the decoded record.
    #[test]
    fn tail_bytes_are_ignored(record in any_record(), tail in prop::collection::vec(any::<u8>(), 32)) {
        let mut bytes = encode(&record).as_bytes().to_vec();
        bytes[TAG_DATA_LEN..].copy_from_slice(&tail);
        let decoded = decode(&bytes).unwrap();
        prop_assert_eq!(decoded.material_type, record.material_type);
        prop_assert_eq!(decoded.weight_class, record.weight_class);
    }
}
