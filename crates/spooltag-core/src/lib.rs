//! Core domain model for the spooltag filament tag programmer.
//!
//! This crate holds everything the other spooltag crates agree on: the
//! on-tag memory layout and NTAG21x command constants, the filament domain
//! types ([`MaterialRecord`] and its parts), and the error taxonomy shared
//! by the codec, transport, and session layers.
//!
//! No I/O happens here; the crate stays dependency-light so it can sit
//! underneath both the pure codec and the async session engine.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{DataError, Error, ProtectionError, Result, TransportError};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
