//! Hardware abstraction for NTAG21x proximity transports.
//!
//! This crate defines the trait boundary between the spooltag session engine
//! and the physical NFC link: a [`TagTransport`] carries single in-flight
//! page exchanges with one detected tag, and a [`TagConnector`] models the
//! proximity session itself (waiting for a tag to arrive, handing out a
//! transport, releasing the field when the transport is dropped).
//!
//! All I/O methods are native `async fn` in traits (Edition 2024 RPITIT);
//! no `async_trait` macro is involved. The traits are therefore not
//! object-safe; use generic type parameters, which is how the session
//! engine consumes them.
//!
//! # Mock hardware
//!
//! [`mock::MockTag`] simulates a complete NTAG213/215/216 including lock
//! bytes, password protection, and scripted faults, enabling deterministic
//! unit testing of every session flow without a physical reader.
//!
//! [`mock::MockTag`]: crate::mock::MockTag

pub mod mock;
pub mod traits;

pub use mock::{MockConnector, MockTag, SharedMockTag};
pub use traits::{AuthStatus, TagConnector, TagTransport};
