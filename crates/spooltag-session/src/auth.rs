//! Password authenticator: ordered candidate secrets against PWD_AUTH.
//!
//! A transport-level error on a candidate means "this candidate failed",
//! not a fatal abort: some tags drop the RF link on a wrong PWD_AUTH, and
//! punishing that with an abort would end the search one candidate early.
//! A protocol-level rejection likewise moves to the next candidate. The
//! first accepted candidate ends the search.
//!
//! The primary write flow does NOT call this before writing: target
//! hardware usually accepts unauthenticated writes, so writes go out
//! directly and fall back to diagnostics on failure. Whether to try
//! passwords automatically on a failed write is an open product question;
//! until it is answered this type stays a reachable, separate API.

use spooltag_core::error::{Error, ProtectionError};
use spooltag_core::types::{Pack, PasswordSecret};
use spooltag_hardware::traits::{AuthStatus, TagTransport};
use tracing::{debug, info};

/// Tries an ordered list of candidate secrets until one is accepted.
#[derive(Debug, Clone)]
pub struct PasswordAuthenticator {
    candidates: Vec<PasswordSecret>,
}

impl PasswordAuthenticator {
    /// Authenticator with an explicit candidate list, tried in order.
    #[must_use]
    pub fn new(candidates: Vec<PasswordSecret>) -> Self {
        Self { candidates }
    }

    /// The candidate secrets, in trial order.
    #[must_use]
    pub fn candidates(&self) -> &[PasswordSecret] {
        &self.candidates
    }

    /// Try every candidate against the tag.
    ///
    /// Returns the PACK of the first accepted candidate.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError::PasswordRequired`] once the list is
    /// exhausted. The threshold page is unknown at this level; lock
    /// diagnostics, not authentication, discovers AUTH0.
    pub async fn try_unlock<T: TagTransport>(&self, transport: &mut T) -> Result<Pack, Error> {
        let total = self.candidates.len();
        for (index, candidate) in self.candidates.iter().enumerate() {
            debug!(candidate = index + 1, total, "trying password candidate");

            match transport.authenticate(candidate).await {
                Ok(AuthStatus::Accepted { pack }) => {
                    info!(candidate = index + 1, %pack, "password accepted");
                    return Ok(pack);
                }
                Ok(AuthStatus::Rejected) => {
                    debug!(candidate = index + 1, "password rejected");
                }
                Err(err) => {
                    // Candidate failure, not abort: some tags drop the link
                    // instead of answering NAK.
                    debug!(candidate = index + 1, %err, "candidate failed at transport level");
                }
            }
        }

        Err(ProtectionError::PasswordRequired {
            first_protected_page: None,
        }
        .into())
    }
}

impl Default for PasswordAuthenticator {
    /// Candidates observed in the field: factory default, then all-zero.
    fn default() -> Self {
        Self::new(vec![PasswordSecret::FACTORY_DEFAULT, PasswordSecret::ZERO])
    }
}
