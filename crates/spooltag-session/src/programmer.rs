//! Multi-session flows above single sessions.
//!
//! The proximity link supports one continuous low-level exchange sequence
//! before it intentionally closes, so write verification cannot happen in
//! the write session. The [`Programmer`] owns that seam: it runs the write
//! session to completion, lets the link release, then opens an independent
//! verify session: a scheduled continuation, not a blocking wait. The two
//! sessions share nothing but the written image, carried in a
//! write-once/take-once [`VerifySlot`].

use crate::outcome::SessionOutcome;
use crate::session::{SessionConfig, TagOperation, TagSession};
use spooltag_codec::TagImage;
use spooltag_core::error::Error;
use spooltag_core::types::MaterialRecord;
use spooltag_hardware::traits::TagConnector;
use tokio::time::sleep;
use tracing::{debug, info};

/// Holder for the last written image, pending verification.
///
/// Write-once, read-once: [`take`](VerifySlot::take) clears the slot
/// regardless of what the verify session later concludes, so a stale image
/// can never be verified against a different write.
#[derive(Debug, Default)]
pub struct VerifySlot(Option<TagImage>);

impl VerifySlot {
    /// Store an image, replacing any previous pending image.
    pub fn store(&mut self, image: TagImage) {
        self.0 = Some(image);
    }

    /// Remove and return the pending image.
    pub fn take(&mut self) -> Option<TagImage> {
        self.0.take()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Result of a write request: the write session's outcome plus, when the
/// write succeeded, the chained verify session's outcome.
///
/// `verify` stays `None` when the write failed (there is nothing to check).
/// A mismatch in `verify` does not rewrite `write`; the two signals stay
/// separate.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFlow {
    pub write: SessionOutcome,
    pub verify: Option<SessionOutcome>,
}

impl WriteFlow {
    /// True when the write succeeded and verification passed.
    #[must_use]
    pub fn is_fully_verified(&self) -> bool {
        matches!(self.write, SessionOutcome::WriteOk { .. })
            && matches!(self.verify, Some(SessionOutcome::VerifyOk))
    }
}

/// UI-facing driver: one method per user-visible operation, each opening
/// its own proximity session(s) via the injected connector.
pub struct Programmer<C: TagConnector> {
    connector: C,
    config: SessionConfig,
    pending_verify: VerifySlot,
}

impl<C: TagConnector> Programmer<C> {
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, SessionConfig::default())
    }

    pub fn with_config(connector: C, config: SessionConfig) -> Self {
        Self {
            connector,
            config,
            pending_verify: VerifySlot::default(),
        }
    }

    /// Read the tag's image. Decoding is the caller's next step.
    pub async fn read(&mut self) -> SessionOutcome {
        self.run_session(TagOperation::Read).await
    }

    /// Format the tag back to a blank state.
    pub async fn format(&mut self) -> SessionOutcome {
        self.run_session(TagOperation::Format).await
    }

    /// Run lock diagnostics and report the verdict.
    pub async fn check_lock(&mut self) -> SessionOutcome {
        self.run_session(TagOperation::CheckLock).await
    }

    /// Write a record, then verify it in a second, independent session.
    ///
    /// The verify session opens only after the write session has closed and
    /// the configured handoff delay has elapsed, giving the physical
    /// proximity link time to fully release.
    pub async fn write(&mut self, record: MaterialRecord) -> WriteFlow {
        let write = self.run_session(TagOperation::Write(record)).await;

        let SessionOutcome::WriteOk { written } = &write else {
            return WriteFlow {
                write,
                verify: None,
            };
        };
        self.pending_verify.store(*written);

        info!("write session closed; scheduling verification");
        sleep(self.config.verify_handoff).await;

        let verify = self.verify_pending().await;
        WriteFlow {
            write,
            verify: Some(verify),
        }
    }

    /// Verify the pending written image, consuming it.
    ///
    /// Public so a caller that lost the tag between sessions can retry the
    /// verification step, but the slot only ever holds one use.
    pub async fn verify_pending(&mut self) -> SessionOutcome {
        match self.pending_verify.take() {
            Some(expected) => self.run_session(TagOperation::Verify(expected)).await,
            None => SessionOutcome::Failed(Error::unknown(
                "no written image pending verification",
            )),
        }
    }

    /// True when a written image awaits verification.
    #[must_use]
    pub fn has_pending_verify(&self) -> bool {
        !self.pending_verify.is_empty()
    }

    async fn run_session(&mut self, operation: TagOperation) -> SessionOutcome {
        debug!(operation = operation.name(), "requesting proximity session");
        match self.connector.connect().await {
            Ok(transport) => {
                TagSession::new(transport, self.config.clone())
                    .execute(operation)
                    .await
            }
            Err(err) => SessionOutcome::Failed(err.into()),
        }
    }
}
