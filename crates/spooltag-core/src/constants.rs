//! Memory-layout and command constants for NTAG21x filament tags.
//!
//! The filament record occupies the user memory of an NTAG213/215/216 tag,
//! starting at page 4. All multi-byte integers are little-endian.
//!
//! # Record layout
//!
//! Offsets are relative to the start of the 144-byte image (= page 4 byte 0):
//!
//! | Offset | Length | Field |
//! |--------|--------|------------------------------------|
//! | 0      | 4      | magic marker `7B 00 65 00`          |
//! | 4      | 20     | SKU text (NUL-padded)               |
//! | 24     | 20     | brand text (NUL-padded)             |
//! | 44     | 20     | material label text (NUL-padded)    |
//! | 64     | 4      | color, stored alpha/blue/green/red  |
//! | 80     | 4      | extruder min/max (2 × LE16, °C)     |
//! | 100    | 4      | bed min/max (2 × LE16, °C)          |
//! | 104    | 4      | diameter (LE16) + length m (LE16)   |
//! | 108    | 4      | reserved trailer `E8 03 00 00`      |
//!
//! Bytes not listed above are zero. Only the first 112 bytes (28 pages)
//! carry data; the image is still 144 bytes (36 pages) because reads sweep
//! a little past the record to cover all tag variants.

// ============================================================================
// Image geometry
// ============================================================================

/// Bytes per tag memory page.
pub const PAGE_SIZE: usize = 4;

/// First user-memory page; the record image starts here.
pub const USER_BASE_PAGE: u8 = 4;

/// Pages that carry record data (pages 4-31 inclusive).
pub const USER_PAGE_COUNT: usize = 28;

/// Meaningful prefix of the image in bytes (28 pages × 4).
///
/// [`TAG_IMAGE_LEN`] minus this is read and preserved but never interpreted.
pub const TAG_DATA_LEN: usize = 112;

/// Pages covered by a full image read (pages 4-39 inclusive).
pub const TAG_IMAGE_PAGES: usize = 36;

/// Total image size in bytes.
pub const TAG_IMAGE_LEN: usize = TAG_IMAGE_PAGES * PAGE_SIZE;

/// Verification never compares past this many bytes.
pub const VERIFY_WINDOW: usize = TAG_DATA_LEN;

// ============================================================================
// Record field offsets
// ============================================================================

/// Marker identifying a populated filament record.
///
/// An all-zero first page is the canonical "blank tag" signal, so the marker
/// must stay non-zero in its first byte.
pub const MAGIC_MARKER: [u8; 4] = [0x7B, 0x00, 0x65, 0x00];

/// Width of each NUL-padded text slot (SKU, brand, material label).
pub const TEXT_SLOT_LEN: usize = 20;

pub const OFFSET_MAGIC: usize = 0;
pub const OFFSET_SKU: usize = 4;
pub const OFFSET_BRAND: usize = 24;
pub const OFFSET_MATERIAL_LABEL: usize = 44;
pub const OFFSET_COLOR: usize = 64;
pub const OFFSET_EXTRUDER_TEMPS: usize = 80;
pub const OFFSET_BED_TEMPS: usize = 100;
pub const OFFSET_DIAMETER: usize = 104;
pub const OFFSET_LENGTH_METERS: usize = 106;
pub const OFFSET_RESERVED: usize = 108;

/// Filament diameter stored on every record: 1.75 mm in hundredths.
pub const FILAMENT_DIAMETER_HUNDREDTHS: u16 = 175;

/// Fixed trailer written at [`OFFSET_RESERVED`]; invariant across records.
pub const RESERVED_TRAILER: [u8; 4] = [0xE8, 0x03, 0x00, 0x00];

/// RGB channels at or below this value decode as true black.
///
/// The consuming hardware treats all-zero RGB as "no color set", so encode
/// substitutes (1,1,1) for user-chosen black and decode folds near-zero
/// channels back to (0,0,0).
pub const NEAR_BLACK_TOLERANCE: u8 = 2;

// ============================================================================
// NTAG21x command set
// ============================================================================

/// READ command opcode (returns 4 pages starting at the given page).
pub const CMD_READ: u8 = 0x30;

/// WRITE command opcode (one 4-byte page).
pub const CMD_WRITE: u8 = 0xA2;

/// PWD_AUTH command opcode (4-byte password, answers 2-byte PACK).
pub const CMD_PWD_AUTH: u8 = 0x1B;

/// Positive acknowledge returned by WRITE.
pub const ACK_BYTE: u8 = 0x0A;

/// Negative acknowledge.
pub const NAK_BYTE: u8 = 0x00;

/// Tag password length in bytes.
pub const PASSWORD_LEN: usize = 4;

/// Password acknowledge (PACK) length in bytes.
pub const PACK_LEN: usize = 2;

/// Minimum UID length in bytes (ISO 14443).
pub const MIN_UID_LEN: usize = 4;

/// Maximum UID length in bytes (ISO 14443).
pub const MAX_UID_LEN: usize = 10;

// ============================================================================
// Configuration page geography (NTAG215 numbering)
// ============================================================================

/// Static lock bytes live in page 2, bytes 2-3.
pub const STATIC_LOCK_PAGE: u8 = 2;

/// Capability container page, written during format.
pub const CC_PAGE: u8 = 3;

/// Capability container value for a formatted tag (NDEF, 496 bytes).
pub const CC_BYTES: [u8; 4] = [0xE1, 0x10, 0x3E, 0x00];

/// Dynamic lock bytes page. Absent on NTAG213; a failed read of this page
/// is evidence of the smaller variant, not an error.
pub const DYNAMIC_LOCK_PAGE: u8 = 40;

/// Configuration page holding AUTH0 in its last byte.
pub const CONFIG_PAGE: u8 = 41;

/// Byte index of AUTH0 within [`CONFIG_PAGE`].
pub const AUTH0_BYTE_INDEX: usize = 3;

/// Page whose first byte is the ACCESS configuration byte.
pub const ACCESS_PAGE: u8 = 42;

/// Page holding the 4-byte PWD.
pub const PWD_PAGE: u8 = 43;

/// Page whose first two bytes are the PACK.
pub const PACK_PAGE: u8 = 44;

/// AUTH0 value meaning "no page requires authentication".
pub const AUTH0_DISABLED: u8 = 0xFF;

// Static lock byte 2 bit masks.

/// Pages 3-15 are write-locked.
pub const LOCK_BIT_USER_PAGES: u8 = 0x08;

/// The lock bytes themselves can no longer be changed.
pub const LOCK_BIT_PERMANENT: u8 = 0x01;

/// OTP area is locked.
pub const LOCK_BIT_OTP: u8 = 0x02;

// ============================================================================
// Session pacing
// ============================================================================

/// Delay between consecutive page writes (milliseconds).
///
/// The tag's EEPROM needs a moment per programming cycle; pushing writes
/// back-to-back provokes NAKs on real hardware.
pub const WRITE_PACING_MS: u64 = 5;

/// How long the write session lingers before closing, letting the user see
/// the completion feedback (milliseconds).
pub const WRITE_LINGER_MS: u64 = 500;

/// Gap between closing the write session and opening the verify session,
/// allowing the proximity link to fully release (milliseconds).
pub const VERIFY_HANDOFF_MS: u64 = 1000;
