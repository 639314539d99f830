//! Encode and decode the filament record against the fixed memory layout.

use crate::image::TagImage;
use spooltag_core::constants::*;
use spooltag_core::error::DataError;
use spooltag_core::types::{
    DisplayColor, MaterialRecord, MaterialType, SpoolWeightClass, TemperatureRange,
};

/// Encode a record into a full tag image.
///
/// Total and failure-free: every record produces exactly 144 bytes. Text
/// fields are UTF-8, left-justified in their 20-byte slots, NUL-padded, and
/// truncated at a character boundary when too long.
///
/// Pure-black RGB is substituted with (1,1,1) before storing because the
/// consuming hardware reserves all-zero RGB to mean "no color set".
#[must_use]
pub fn encode(record: &MaterialRecord) -> TagImage {
    let mut image = TagImage::blank();
    let bytes = image.as_mut_bytes();

    bytes[OFFSET_MAGIC..OFFSET_MAGIC + PAGE_SIZE].copy_from_slice(&MAGIC_MARKER);

    write_text_slot(&mut bytes[OFFSET_SKU..OFFSET_SKU + TEXT_SLOT_LEN], &record.sku);
    write_text_slot(
        &mut bytes[OFFSET_BRAND..OFFSET_BRAND + TEXT_SLOT_LEN],
        &record.brand,
    );
    write_text_slot(
        &mut bytes[OFFSET_MATERIAL_LABEL..OFFSET_MATERIAL_LABEL + TEXT_SLOT_LEN],
        record.material_type.label(),
    );

    // Stored channel order is alpha, blue, green, red.
    let (red, green, blue) = if record.color.is_pure_black() {
        (1, 1, 1)
    } else {
        (record.color.red, record.color.green, record.color.blue)
    };
    bytes[OFFSET_COLOR] = record.color.alpha;
    bytes[OFFSET_COLOR + 1] = blue;
    bytes[OFFSET_COLOR + 2] = green;
    bytes[OFFSET_COLOR + 3] = red;

    write_u16_le(bytes, OFFSET_EXTRUDER_TEMPS, record.temperatures.extruder_min);
    write_u16_le(bytes, OFFSET_EXTRUDER_TEMPS + 2, record.temperatures.extruder_max);
    write_u16_le(bytes, OFFSET_BED_TEMPS, record.temperatures.bed_min);
    write_u16_le(bytes, OFFSET_BED_TEMPS + 2, record.temperatures.bed_max);

    write_u16_le(bytes, OFFSET_DIAMETER, FILAMENT_DIAMETER_HUNDREDTHS);
    write_u16_le(bytes, OFFSET_LENGTH_METERS, record.weight_class.length_meters());

    bytes[OFFSET_RESERVED..OFFSET_RESERVED + PAGE_SIZE].copy_from_slice(&RESERVED_TRAILER);

    image
}

/// Decode tag bytes into a record.
///
/// Needs at least the meaningful 112-byte prefix; anything past it is
/// ignored. The material label and weight bucket resolve leniently (unknown
/// values fall back to defaults) because both are advisory, not control
/// channels.
///
/// # Errors
///
/// - [`DataError::TooShort`] below 112 bytes.
/// - [`DataError::BlankTag`] when the first byte is zero. Callers should
///   treat this as "unprogrammed tag", not a fault.
pub fn decode(bytes: &[u8]) -> Result<MaterialRecord, DataError> {
    if bytes.len() < TAG_DATA_LEN {
        return Err(DataError::too_short(bytes.len(), TAG_DATA_LEN));
    }
    if bytes[OFFSET_MAGIC] == 0x00 {
        return Err(DataError::BlankTag);
    }

    let sku = read_text_slot(&bytes[OFFSET_SKU..OFFSET_SKU + TEXT_SLOT_LEN]);
    let brand = read_text_slot(&bytes[OFFSET_BRAND..OFFSET_BRAND + TEXT_SLOT_LEN]);
    let label =
        read_text_slot(&bytes[OFFSET_MATERIAL_LABEL..OFFSET_MATERIAL_LABEL + TEXT_SLOT_LEN]);
    let material_type = MaterialType::from_label(&label);

    // Channels come back in alpha, blue, green, red order. Near-zero RGB is
    // the encode-time stand-in for black; fold it back.
    let alpha = bytes[OFFSET_COLOR];
    let blue = bytes[OFFSET_COLOR + 1];
    let green = bytes[OFFSET_COLOR + 2];
    let red = bytes[OFFSET_COLOR + 3];
    let color = if red <= NEAR_BLACK_TOLERANCE
        && green <= NEAR_BLACK_TOLERANCE
        && blue <= NEAR_BLACK_TOLERANCE
    {
        DisplayColor::new(alpha, 0, 0, 0)
    } else {
        DisplayColor::new(alpha, red, green, blue)
    };

    let temperatures = TemperatureRange::new(
        read_u16_le(bytes, OFFSET_EXTRUDER_TEMPS),
        read_u16_le(bytes, OFFSET_EXTRUDER_TEMPS + 2),
        read_u16_le(bytes, OFFSET_BED_TEMPS),
        read_u16_le(bytes, OFFSET_BED_TEMPS + 2),
    );

    let length = read_u16_le(bytes, OFFSET_LENGTH_METERS);
    let weight_class = SpoolWeightClass::from_length_meters(length);

    Ok(MaterialRecord {
        material_type,
        brand,
        sku,
        temperatures,
        color,
        weight_class,
    })
}

/// Left-justify `text` into `slot`, NUL-padding the rest. Truncation lands
/// on a UTF-8 character boundary so the slot never holds a broken sequence.
fn write_text_slot(slot: &mut [u8], text: &str) {
    let mut end = text.len().min(slot.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    slot[..end].copy_from_slice(&text.as_bytes()[..end]);
    for byte in &mut slot[end..] {
        *byte = 0x00;
    }
}

/// Recover text from a fixed slot: lossy UTF-8, NUL padding stripped,
/// surrounding whitespace trimmed.
fn read_text_slot(slot: &[u8]) -> String {
    String::from_utf8_lossy(slot)
        .replace('\0', "")
        .trim()
        .to_string()
}

fn write_u16_le(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_record() -> MaterialRecord {
        MaterialRecord::new(MaterialType::Pla, "Anycubic", "AHPLA-001")
            .with_color(DisplayColor::opaque(0x20, 0x60, 0xC0))
            .with_weight_class(SpoolWeightClass::Kg1)
    }

    #[test]
    fn encode_writes_magic_marker() {
        let image = encode(&sample_record());
        assert_eq!(&image.as_bytes()[0..4], &[0x7B, 0x00, 0x65, 0x00]);
    }

    #[test]
    fn encode_is_always_full_length() {
        let long_text = "x".repeat(500);
        let record = MaterialRecord::new(MaterialType::Abs, long_text.clone(), long_text);
        assert_eq!(encode(&record).as_bytes().len(), TAG_IMAGE_LEN);

        let empty = MaterialRecord::new(MaterialType::Abs, "", "");
        assert_eq!(encode(&empty).as_bytes().len(), TAG_IMAGE_LEN);
    }

    #[test]
    fn encode_places_color_channels_in_abgr_order() {
        let record = sample_record().with_color(DisplayColor::opaque(0xFF, 0x00, 0x00));
        let bytes = encode(&record);
        let bytes = bytes.as_bytes();
        assert_eq!(bytes[64], 0xFF); // alpha
        assert_eq!(bytes[65], 0x00); // blue
        assert_eq!(bytes[66], 0x00); // green
        assert_eq!(bytes[67], 0xFF); // red
    }

    #[test]
    fn encode_substitutes_reserved_black() {
        let record = sample_record().with_color(DisplayColor::opaque(0, 0, 0));
        let bytes = encode(&record);
        let bytes = bytes.as_bytes();
        assert_eq!(bytes[65], 1);
        assert_eq!(bytes[66], 1);
        assert_eq!(bytes[67], 1);
    }

    #[test]
    fn encode_writes_temperatures_little_endian() {
        let record = sample_record()
            .with_temperatures(TemperatureRange::new(0x0102, 0x0304, 0x0506, 0x0708));
        let bytes = encode(&record);
        let bytes = bytes.as_bytes();
        assert_eq!(&bytes[80..84], &[0x02, 0x01, 0x04, 0x03]);
        assert_eq!(&bytes[100..104], &[0x06, 0x05, 0x08, 0x07]);
    }

    #[test]
    fn encode_writes_diameter_and_reserved_trailer() {
        let bytes = encode(&sample_record());
        let bytes = bytes.as_bytes();
        assert_eq!(read_u16_le(bytes, OFFSET_DIAMETER), 175);
        assert_eq!(read_u16_le(bytes, OFFSET_LENGTH_METERS), 330);
        assert_eq!(&bytes[108..112], &[0xE8, 0x03, 0x00, 0x00]);
        assert!(bytes[112..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_rejects_short_input() {
        let err = decode(&[0x7B; 100]).unwrap_err();
        assert!(matches!(err, DataError::TooShort { actual: 100, .. }));
    }

    #[test]
    fn decode_reports_blank_tag() {
        let err = decode(&[0u8; TAG_IMAGE_LEN]).unwrap_err();
        assert_eq!(err, DataError::BlankTag);
    }

    #[test]
    fn decode_accepts_exactly_the_data_prefix() {
        let image = encode(&sample_record());
        let record = decode(&image.as_bytes()[..TAG_DATA_LEN]).unwrap();
        assert_eq!(record.brand, "Anycubic");
    }

    #[rstest]
    #[case(MaterialType::Pla)]
    #[case(MaterialType::PlaPlus)]
    #[case(MaterialType::Petg)]
    #[case(MaterialType::Nylon)]
    #[case(MaterialType::Hips)]
    fn roundtrip_preserves_material_type(#[case] material_type: MaterialType) {
        let record = MaterialRecord::new(material_type, "Generic", "");
        let back = decode(encode(&record).as_bytes()).unwrap();
        assert_eq!(back.material_type, material_type);
    }

    #[rstest]
    #[case(DisplayColor::opaque(0, 0, 0))]
    #[case(DisplayColor::opaque(255, 255, 255))]
    #[case(DisplayColor::opaque(255, 0, 0))]
    #[case(DisplayColor::new(0x80, 0x10, 0x20, 0x30))]
    fn roundtrip_preserves_color_semantically(#[case] color: DisplayColor) {
        let record = sample_record().with_color(color);
        let back = decode(encode(&record).as_bytes()).unwrap();
        assert_eq!(back.color, color);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(500, 500)]
    fn roundtrip_preserves_boundary_temperatures(#[case] low: u16, #[case] high: u16) {
        let record =
            sample_record().with_temperatures(TemperatureRange::new(low, high, low, high));
        let back = decode(encode(&record).as_bytes()).unwrap();
        assert_eq!(back.temperatures, TemperatureRange::new(low, high, low, high));
    }

    #[test]
    fn decode_trims_slot_padding_and_whitespace() {
        let record = MaterialRecord::new(MaterialType::Pla, "  Overture ", "PLA-01 ");
        let back = decode(encode(&record).as_bytes()).unwrap();
        assert_eq!(back.brand, "Overture");
        assert_eq!(back.sku, "PLA-01");
    }

    #[test]
    fn decode_falls_back_on_unknown_label_and_length() {
        let mut image = encode(&sample_record());
        write_text_slot(
            &mut image.as_mut_bytes()[OFFSET_MATERIAL_LABEL..OFFSET_MATERIAL_LABEL + TEXT_SLOT_LEN],
            "Wood Fill",
        );
        write_u16_le(image.as_mut_bytes(), OFFSET_LENGTH_METERS, 1234);

        let record = decode(image.as_bytes()).unwrap();
        assert_eq!(record.material_type, MaterialType::Pla);
        assert_eq!(record.weight_class, SpoolWeightClass::Kg1);
    }

    #[test]
    fn multibyte_text_truncates_on_char_boundary() {
        // 7 × 3-byte characters = 21 bytes; the slot holds 20, so the last
        // character must be dropped whole.
        let brand = "あ".repeat(7);
        let record = MaterialRecord::new(MaterialType::Pla, brand, "");
        let back = decode(encode(&record).as_bytes()).unwrap();
        assert_eq!(back.brand, "あ".repeat(6));
    }

    #[test]
    fn end_to_end_generic_pla_scenario() {
        let record = MaterialRecord::new(MaterialType::Pla, "Generic", "")
            .with_weight_class(SpoolWeightClass::Kg0_25);
        let back = decode(encode(&record).as_bytes()).unwrap();
        assert_eq!(back.brand, "Generic");
        assert_eq!(back.material_type, MaterialType::Pla);
        assert_eq!(back.weight_class, SpoolWeightClass::Kg0_25);
        assert_eq!(back.sku, "");
    }
}
