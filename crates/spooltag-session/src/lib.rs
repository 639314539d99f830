//! Tag session engine: sequences one logical operation per proximity
//! session.
//!
//! This crate is the coordination layer between the pure codec, the page
//! transport, and the caller. A [`TagSession`] drives exactly one operation
//! (read, write, format, lock-check, or verify) across one proximity
//! session as an explicit state machine, one awaited page exchange at a
//! time, with iterative loops instead of nested callbacks.
//!
//! The [`Programmer`] sits above sessions and owns the flows that span more
//! than one: a write schedules an independent verify session after the
//! proximity link has been released, threading the written image through a
//! write-once/take-once [`VerifySlot`].
//!
//! Write and format failures are never reported as bare NAKs: the engine
//! automatically runs [`lock diagnostics`](diagnostics) inside the same
//! session and classifies the failure into a
//! [`ProtectionError`](spooltag_core::ProtectionError) the presentation
//! layer can turn into a concrete remediation.

pub mod auth;
pub mod diagnostics;
pub mod outcome;
pub mod programmer;
pub mod session;
pub mod state;

pub use auth::PasswordAuthenticator;
pub use diagnostics::{LockVerdict, read_lock_state};
pub use outcome::SessionOutcome;
pub use programmer::{Programmer, VerifySlot, WriteFlow};
pub use session::{SessionConfig, TagOperation, TagSession};
pub use state::{SessionState, StateMachine, StateTransition};
