//! Lock diagnostics: classify a tag's protection configuration.
//!
//! Three page groups are read, in order: the static lock bytes (page 2),
//! the dynamic lock bytes (page 40; a failed read there is evidence of the
//! smaller NTAG213 variant, not an error), and the
//! password configuration (AUTH0 in page 41, ACCESS in page 42).
//!
//! Classification itself is pure: [`LockVerdict::from_pages`] maps page
//! bytes to a verdict with no I/O, so it can be tested exhaustively without
//! a transport.

use serde::{Deserialize, Serialize};
use spooltag_core::constants::{
    ACCESS_PAGE, AUTH0_BYTE_INDEX, AUTH0_DISABLED, CONFIG_PAGE, DYNAMIC_LOCK_PAGE,
    LOCK_BIT_OTP, LOCK_BIT_PERMANENT, LOCK_BIT_USER_PAGES, PAGE_SIZE, STATIC_LOCK_PAGE,
};
use spooltag_core::error::{Error, ProtectionError, TransportError};
use spooltag_hardware::traits::TagTransport;
use std::fmt;
use tracing::debug;

/// Structured diagnostic result for a tag's protection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockVerdict {
    /// Static lock bit: pages 3-15 are write-locked.
    pub user_pages_locked: bool,

    /// Static lock bit: the lock bytes themselves can no longer change.
    pub lock_bits_locked: bool,

    /// Static lock bit: OTP area locked.
    pub otp_locked: bool,

    /// Dynamic lock byte triple, `None` on variants without one.
    pub dynamic_lock: Option<[u8; 3]>,

    /// First page requiring authentication, `None` when AUTH0 is `0xFF`
    /// (no password protection).
    pub password_required_from: Option<u8>,

    /// ACCESS configuration byte, when its page was readable.
    pub access: Option<u8>,
}

impl LockVerdict {
    /// Build a verdict from raw page bytes. Pure.
    ///
    /// `dynamic_page` and `access_page` are `None` when the corresponding
    /// read failed; absent dynamic lock bytes identify a smaller tag
    /// variant and are not an error.
    #[must_use]
    pub fn from_pages(
        static_lock_page: [u8; PAGE_SIZE],
        dynamic_page: Option<[u8; PAGE_SIZE]>,
        config_page: [u8; PAGE_SIZE],
        access_page: Option<[u8; PAGE_SIZE]>,
    ) -> Self {
        let lock_byte = static_lock_page[2];
        let auth0 = config_page[AUTH0_BYTE_INDEX];

        Self {
            user_pages_locked: lock_byte & LOCK_BIT_USER_PAGES != 0,
            lock_bits_locked: lock_byte & LOCK_BIT_PERMANENT != 0,
            otp_locked: lock_byte & LOCK_BIT_OTP != 0,
            dynamic_lock: dynamic_page.map(|p| [p[0], p[1], p[2]]),
            password_required_from: (auth0 < AUTH0_DISABLED).then_some(auth0),
            access: access_page.map(|p| p[0]),
        }
    }

    /// True when AUTH0 names a protected page.
    #[must_use]
    pub fn password_required(&self) -> bool {
        self.password_required_from.is_some()
    }

    /// True when any dynamic lock bit is set.
    #[must_use]
    pub fn dynamic_lock_set(&self) -> bool {
        self.dynamic_lock
            .is_some_and(|bytes| bytes.iter().any(|&b| b != 0))
    }

    /// True when any non-permanent write lock is set.
    #[must_use]
    pub fn any_pages_locked(&self) -> bool {
        self.user_pages_locked || self.otp_locked || self.dynamic_lock_set()
    }

    /// True when nothing on the tag restricts writes.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        !self.password_required() && !self.any_pages_locked() && !self.lock_bits_locked
    }

    /// Classify a failed write or format using this verdict.
    ///
    /// Priority order: password protection, then any non-permanent lock,
    /// then permanently frozen lock bits. When the verdict explains
    /// nothing, the opaque rejection is reported as unknown, carrying the
    /// original transport error for context.
    #[must_use]
    pub fn classify_failure(&self, original: &TransportError) -> Error {
        if let Some(page) = self.password_required_from {
            return ProtectionError::password_required(page).into();
        }
        if self.any_pages_locked() {
            return ProtectionError::PagesLocked.into();
        }
        if self.lock_bits_locked {
            return ProtectionError::PermanentlyLocked.into();
        }
        Error::unknown(format!("write rejected with no lock explanation: {original}"))
    }
}

impl fmt::Display for LockVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_writable() {
            return write!(f, "tag is writable");
        }
        let mut parts = Vec::new();
        if let Some(page) = self.password_required_from {
            parts.push(format!("password required from page {page}"));
        }
        if self.user_pages_locked {
            parts.push("pages 3-15 locked".to_string());
        }
        if self.otp_locked {
            parts.push("OTP locked".to_string());
        }
        if self.dynamic_lock_set() {
            parts.push("dynamic locks set".to_string());
        }
        if self.lock_bits_locked {
            parts.push("lock bits permanently locked".to_string());
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Read the lock configuration pages and produce a verdict.
///
/// Performs no writes. The dynamic-lock and ACCESS page reads are allowed
/// to fail (smaller variants); the static lock and AUTH0 reads are not.
///
/// # Errors
///
/// Returns the underlying [`TransportError`] when the static lock page or
/// the configuration page cannot be read.
pub async fn read_lock_state<T: TagTransport>(
    transport: &mut T,
) -> Result<LockVerdict, TransportError> {
    let static_lock_page = transport.read_page(STATIC_LOCK_PAGE).await?;

    let dynamic_page = match transport.read_page(DYNAMIC_LOCK_PAGE).await {
        Ok(page) => Some(page),
        Err(err) => {
            debug!(%err, "dynamic lock bytes unreadable; assuming smaller tag variant");
            None
        }
    };

    let config_page = transport.read_page(CONFIG_PAGE).await?;

    let access_page = match transport.read_page(ACCESS_PAGE).await {
        Ok(page) => Some(page),
        Err(err) => {
            debug!(%err, "ACCESS byte unreadable; continuing without it");
            None
        }
    };

    Ok(LockVerdict::from_pages(
        static_lock_page,
        dynamic_page,
        config_page,
        access_page,
    ))
}
