//! One proximity session, one operation.

use crate::diagnostics::read_lock_state;
use crate::outcome::SessionOutcome;
use crate::state::{SessionState, StateMachine};
use bytes::BytesMut;
use spooltag_codec::{TagImage, encode};
use spooltag_core::constants::{
    CC_BYTES, CC_PAGE, STATIC_LOCK_PAGE, TAG_IMAGE_LEN, TAG_IMAGE_PAGES, USER_BASE_PAGE,
    USER_PAGE_COUNT, VERIFY_HANDOFF_MS, VERIFY_WINDOW, WRITE_LINGER_MS, WRITE_PACING_MS,
};
use spooltag_core::error::{Error, Result, TransportError};
use spooltag_core::types::MaterialRecord;
use spooltag_hardware::traits::TagTransport;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The operation a session was opened for.
#[derive(Debug, Clone, PartialEq)]
pub enum TagOperation {
    /// Read the full user-memory page run.
    Read,

    /// Encode and write a record.
    Write(MaterialRecord),

    /// Write the capability container, clear the lock-configuration page,
    /// and blank the user memory.
    Format,

    /// Run lock diagnostics.
    CheckLock,

    /// Read back and compare against a previously written image.
    Verify(TagImage),
}

impl TagOperation {
    /// Session state this operation runs in.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        match self {
            TagOperation::Read => SessionState::Reading,
            TagOperation::Write(_) => SessionState::Writing,
            TagOperation::Format => SessionState::Formatting,
            TagOperation::CheckLock => SessionState::CheckingLock,
            TagOperation::Verify(_) => SessionState::Verifying,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TagOperation::Read => "read",
            TagOperation::Write(_) => "write",
            TagOperation::Format => "format",
            TagOperation::CheckLock => "check-lock",
            TagOperation::Verify(_) => "verify",
        }
    }
}

/// Pacing knobs for session flows.
///
/// Defaults come from the constants tuned against real hardware; tests zero
/// them or run under a paused clock.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between consecutive page writes.
    pub write_pacing: Duration,

    /// Linger after a completed write before the session closes, so the
    /// user sees the completion feedback while still holding the tag.
    pub write_linger: Duration,

    /// Gap between the write session closing and the verify session
    /// opening, letting the proximity link fully release.
    pub verify_handoff: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            write_pacing: Duration::from_millis(WRITE_PACING_MS),
            write_linger: Duration::from_millis(WRITE_LINGER_MS),
            verify_handoff: Duration::from_millis(VERIFY_HANDOFF_MS),
        }
    }
}

impl SessionConfig {
    /// All delays zeroed; for tests that do not model pacing.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            write_pacing: Duration::ZERO,
            write_linger: Duration::ZERO,
            verify_handoff: Duration::ZERO,
        }
    }
}

/// Drives one operation across one proximity session.
///
/// The session owns its transport: terminal states drop it, which closes
/// the underlying proximity link. All multi-page work is an iterative loop
/// with exactly one exchange outstanding; no pipelining, no recursion.
pub struct TagSession<T: TagTransport> {
    transport: T,
    machine: StateMachine,
    session_id: Uuid,
    config: SessionConfig,
}

impl<T: TagTransport> TagSession<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            machine: StateMachine::new(),
            session_id: Uuid::new_v4(),
            config,
        }
    }

    /// This session's correlation id (appears in tracing output).
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Run the operation to a terminal state.
    ///
    /// Never returns a bare `Err`: every failure is folded into
    /// [`SessionOutcome::Failed`] with the session moved to
    /// [`SessionState::Failed`], so callers render outcomes uniformly.
    pub async fn execute(mut self, operation: TagOperation) -> SessionOutcome {
        info!(
            session = %self.session_id,
            operation = operation.name(),
            "opening proximity session"
        );

        match self.run(operation).await {
            Ok(outcome) => {
                let _ = self.machine.transition_to(SessionState::Completed);
                info!(session = %self.session_id, %outcome, "session completed");
                outcome
            }
            Err(err) => {
                let _ = self.machine.transition_to(SessionState::Failed);
                warn!(session = %self.session_id, %err, "session failed");
                SessionOutcome::Failed(err)
            }
        }
    }

    async fn run(&mut self, operation: TagOperation) -> Result<SessionOutcome> {
        self.machine.transition_to(SessionState::Detecting)?;
        let identity = self.transport.identity().await?;
        self.machine.transition_to(SessionState::Identified)?;
        info!(
            session = %self.session_id,
            uid = %identity.uid,
            model = %identity.model,
            "tag identified"
        );

        self.machine.transition_to(operation.session_state())?;

        match operation {
            TagOperation::Read => {
                let image = self.read_image().await?;
                Ok(SessionOutcome::ReadOk { image })
            }
            TagOperation::Write(record) => {
                // Encode once at operation start; the image is the unit of
                // work from here on.
                let image = encode(&record);
                match self.write_record_pages(&image).await {
                    Ok(()) => {
                        sleep(self.config.write_linger).await;
                        Ok(SessionOutcome::WriteOk { written: image })
                    }
                    Err(err) => Err(self.diagnose_write_failure(err).await),
                }
            }
            TagOperation::Format => match self.format_tag().await {
                Ok(()) => Ok(SessionOutcome::FormatOk),
                Err(err) => Err(self.diagnose_write_failure(err).await),
            },
            TagOperation::CheckLock => {
                let verdict = read_lock_state(&mut self.transport).await?;
                Ok(SessionOutcome::LockReport(verdict))
            }
            TagOperation::Verify(expected) => {
                let actual = self.read_image().await?;
                Ok(compare_images(&expected, &actual))
            }
        }
    }

    /// Read the full 36-page image run, one page per exchange, in
    /// increasing order.
    async fn read_image(&mut self) -> Result<TagImage> {
        let mut buffer = BytesMut::with_capacity(TAG_IMAGE_LEN);
        for offset in 0..TAG_IMAGE_PAGES {
            let page = USER_BASE_PAGE + offset as u8;
            let bytes = self.transport.read_page(page).await?;
            buffer.extend_from_slice(&bytes);
        }
        debug!(session = %self.session_id, bytes = buffer.len(), "image read complete");
        Ok(TagImage::from_bytes(&buffer))
    }

    /// Write the 28 record pages sequentially with inter-page pacing.
    /// Aborts on the first failed page; there is no rollback, so a failure
    /// here can leave the tag half-written.
    async fn write_record_pages(
        &mut self,
        image: &TagImage,
    ) -> std::result::Result<(), TransportError> {
        for (index, (page, data)) in image.pages().take(USER_PAGE_COUNT).enumerate() {
            if index > 0 {
                sleep(self.config.write_pacing).await;
            }
            self.transport.write_page(page, data).await?;
        }
        debug!(session = %self.session_id, pages = USER_PAGE_COUNT, "record pages written");
        Ok(())
    }

    /// Format: capability container first, then clear the lock
    /// configuration page, then blank the user memory page run.
    async fn format_tag(&mut self) -> std::result::Result<(), TransportError> {
        self.transport.write_page(CC_PAGE, CC_BYTES).await?;
        debug!(session = %self.session_id, "capability container written");

        self.transport
            .write_page(STATIC_LOCK_PAGE, [0x00; 4])
            .await?;
        debug!(session = %self.session_id, "lock configuration cleared");

        self.write_record_pages(&TagImage::blank()).await
    }

    /// Turn an opaque write/format failure into an actionable
    /// classification by reading the lock configuration within the same
    /// session. If diagnostics itself fails (typically because the link is
    /// gone), the original transport error stands.
    async fn diagnose_write_failure(&mut self, original: TransportError) -> Error {
        warn!(
            session = %self.session_id,
            %original,
            "write rejected; running lock diagnostics"
        );
        match read_lock_state(&mut self.transport).await {
            Ok(verdict) => {
                debug!(session = %self.session_id, %verdict, "diagnostics verdict");
                verdict.classify_failure(&original)
            }
            Err(diag_err) => {
                debug!(session = %self.session_id, %diag_err, "diagnostics unavailable");
                original.into()
            }
        }
    }
}

/// Compare a written image against its read-back.
///
/// The window is the meaningful 112-byte prefix (both images are full
/// length by construction, so the three-way minimum from the product rule
/// collapses to the constant).
fn compare_images(expected: &TagImage, actual: &TagImage) -> SessionOutcome {
    let window = VERIFY_WINDOW
        .min(expected.as_bytes().len())
        .min(actual.as_bytes().len());

    let mut count = 0usize;
    let mut first_offset = None;
    for offset in 0..window {
        if expected.as_bytes()[offset] != actual.as_bytes()[offset] {
            count += 1;
            if first_offset.is_none() {
                first_offset = Some(offset);
            }
        }
    }

    match first_offset {
        None => SessionOutcome::VerifyOk,
        Some(first_offset) => SessionOutcome::VerifyMismatch {
            count,
            first_offset,
        },
    }
}
