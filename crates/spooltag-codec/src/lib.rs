//! Byte-exact codec between [`MaterialRecord`] and the fixed tag memory
//! layout.
//!
//! The codec is pure and allocation-light: [`encode`] is total (any record
//! becomes exactly 144 bytes, text overflow is truncated, never rejected)
//! and [`decode`] fails only on images that are too short or blank.
//!
//! # Round-trip semantics
//!
//! `decode(encode(r))` equals `r` at the semantic level, not the byte level:
//! text fields come back trimmed of their slot padding, and pure-black RGB
//! survives via the reserved-color substitution described on
//! [`spooltag_core::constants::NEAR_BLACK_TOLERANCE`].
//!
//! # Examples
//!
//! ```
//! use spooltag_codec::{decode, encode};
//! use spooltag_core::{MaterialRecord, MaterialType};
//!
//! let record = MaterialRecord::new(MaterialType::Pla, "Generic", "");
//! let image = encode(&record);
//! let back = decode(image.as_bytes()).unwrap();
//! assert_eq!(back.brand, "Generic");
//! ```
//!
//! [`MaterialRecord`]: spooltag_core::MaterialRecord

mod codec;
mod image;

pub use codec::{decode, encode};
pub use image::TagImage;
