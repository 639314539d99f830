//! Error taxonomy shared across the spooltag crates.
//!
//! Three families map to three failure domains:
//!
//! - [`TransportError`]: the proximity link failed mid-exchange. Always
//!   aborts the current operation and surfaces as-is.
//! - [`ProtectionError`]: derived, never raw. Produced by lock diagnostics
//!   after a write or format failure, turning an opaque NAK into an
//!   actionable classification.
//! - [`DataError`]: local to decoding tag bytes. A [`DataError::BlankTag`]
//!   is the normal result of reading an unprogrammed tag and must not be
//!   escalated to a session failure.

use thiserror::Error;

/// Result type alias using the aggregate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the physical page-exchange link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response within the allowed window.
    #[error("tag did not respond within {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The tag answered with a negative acknowledge.
    #[error("tag rejected the command (NAK) at page {page}")]
    Nak { page: u8 },

    /// The proximity session dropped (tag moved away, link invalidated).
    #[error("connection to tag lost: {message}")]
    ConnectionLost { message: String },
}

impl TransportError {
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    pub fn nak(page: u8) -> Self {
        Self::Nak { page }
    }

    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::ConnectionLost {
            message: message.into(),
        }
    }
}

/// Write-protection states diagnosed from the tag's configuration pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtectionError {
    /// AUTH0 names a first protected page below the maximum; writes from
    /// that page onward require PWD_AUTH. The page is `None` when the
    /// requirement was inferred without reading the configuration (e.g.
    /// after exhausting password candidates).
    #[error("tag is password protected{}", .first_protected_page.map(|p| format!(" from page {p}")).unwrap_or_default())]
    PasswordRequired { first_protected_page: Option<u8> },

    /// One or more user pages are write-locked (static or dynamic locks).
    #[error("tag pages are write-locked")]
    PagesLocked,

    /// The lock bytes themselves are frozen; the tag can never be unlocked.
    #[error("tag lock bits are permanently locked")]
    PermanentlyLocked,

    /// The one-time-programmable area is locked.
    #[error("tag OTP area is locked")]
    OtpLocked,
}

impl ProtectionError {
    pub fn password_required(first_protected_page: u8) -> Self {
        Self::PasswordRequired {
            first_protected_page: Some(first_protected_page),
        }
    }
}

/// Failures decoding a tag byte image into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// Fewer bytes than the meaningful 112-byte prefix were supplied.
    #[error("tag image too short: got {actual} bytes, need at least {minimum}")]
    TooShort { actual: usize, minimum: usize },

    /// First byte is zero: the tag has never been written with this format.
    /// Expected for factory-fresh tags; not an alarm condition.
    #[error("tag is blank")]
    BlankTag,

    /// Structurally invalid content.
    #[error("malformed tag data: {message}")]
    Malformed { message: String },
}

impl DataError {
    pub fn too_short(actual: usize, minimum: usize) -> Self {
        Self::TooShort { actual, minimum }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Aggregate error for session-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protection(#[from] ProtectionError),

    #[error(transparent)]
    Data(#[from] DataError),

    /// The session state machine was asked for an illegal transition.
    #[error("invalid session state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Write or format failed and diagnostics found nothing to blame.
    #[error("operation failed: {message}")]
    Unknown { message: String },
}

impl Error {
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// A short remediation hint suitable for the presentation layer.
    ///
    /// The session engine guarantees every terminal failure carries enough
    /// structure to distinguish "try a different tag" from "format first"
    /// from "move closer and retry"; this is the canonical mapping.
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            Error::Transport(TransportError::Timeout { .. })
            | Error::Transport(TransportError::ConnectionLost { .. }) => {
                "Hold the tag steady against the reader and try again"
            }
            Error::Transport(TransportError::Nak { .. }) => {
                "The tag refused the command; check its lock status"
            }
            Error::Protection(ProtectionError::PasswordRequired { .. }) => {
                "This tag requires a password; use a factory-blank tag instead"
            }
            Error::Protection(ProtectionError::PagesLocked)
            | Error::Protection(ProtectionError::OtpLocked) => {
                "Some pages are write-locked; try formatting the tag first"
            }
            Error::Protection(ProtectionError::PermanentlyLocked) => {
                "This tag is permanently locked and cannot be reused"
            }
            Error::Data(DataError::BlankTag) => "Tag is blank; nothing to read",
            Error::Data(_) => "Tag contents are not a filament record",
            Error::InvalidStateTransition { .. } | Error::Unknown { .. } => {
                "Try again with a different tag"
            }
        }
    }
}
