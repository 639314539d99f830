//! Transport trait definitions.
//!
//! The session engine talks to a tag exclusively through these traits. The
//! contract mirrors the NTAG21x command set one level up: single-page reads
//! and writes, one request/response exchange outstanding at a time, plus the
//! PWD_AUTH exchange used by the password authenticator.

#![allow(async_fn_in_trait)]

use spooltag_core::constants::PAGE_SIZE;
use spooltag_core::types::{Pack, PasswordSecret, TagIdentity};
use spooltag_core::error::TransportError;

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Outcome of a PWD_AUTH exchange.
///
/// A rejection is a protocol-level answer from the tag, distinct from a
/// transport failure: the link survived, the candidate was simply wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// The tag accepted the password and answered with its PACK.
    Accepted { pack: Pack },

    /// The tag NAK'd the password.
    Rejected,
}

impl AuthStatus {
    /// True if the exchange authenticated the session.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// One detected tag, reachable for the lifetime of a proximity session.
///
/// Every method is a single blocking round trip on the active link; the
/// caller awaits each response before issuing the next command. Dropping
/// the transport closes the session.
///
/// # Examples
///
/// ```no_run
/// use spooltag_hardware::traits::{Result, TagTransport};
///
/// async fn read_first_user_page<T: TagTransport>(tag: &mut T) -> Result<[u8; 4]> {
///     tag.read_page(4).await
/// }
/// ```
pub trait TagTransport: Send {
    /// Run the identity exchange: UID query plus variant detection.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`](spooltag_core::error::TransportError)
    /// if the link drops or the tag stops answering.
    async fn identity(&mut self) -> Result<TagIdentity>;

    /// Read one 4-byte page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist on this tag variant, the
    /// tag NAKs the read, or the link drops.
    async fn read_page(&mut self, page: u8) -> Result<[u8; PAGE_SIZE]>;

    /// Write one 4-byte page and wait for the ack byte.
    ///
    /// # Errors
    ///
    /// Returns an error on NAK (locked or protected page), timeout, or a
    /// dropped link.
    async fn write_page(&mut self, page: u8, data: [u8; PAGE_SIZE]) -> Result<()>;

    /// Run the PWD_AUTH exchange with a candidate secret.
    ///
    /// A wrong password is reported as [`AuthStatus::Rejected`], not as an
    /// error; errors mean the link itself failed.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or a dropped link. Note that some tags
    /// drop the RF link on a failed PWD_AUTH, which surfaces here as
    /// `ConnectionLost`; callers treat that the same as a rejection.
    async fn authenticate(&mut self, secret: &PasswordSecret) -> Result<AuthStatus>;
}

/// Establishes proximity sessions.
///
/// `connect` resolves once a tag enters the field and the link is up; the
/// returned transport is valid until dropped (or until the tag moves away,
/// at which point its methods fail with `ConnectionLost`).
pub trait TagConnector: Send {
    type Transport: TagTransport;

    /// Open the next proximity session.
    ///
    /// # Errors
    ///
    /// Returns an error if no tag arrives within the backend's detection
    /// window or the reader is unavailable.
    async fn connect(&mut self) -> Result<Self::Transport>;
}
