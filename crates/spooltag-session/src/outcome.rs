//! Terminal result of one session operation.

use crate::diagnostics::LockVerdict;
use spooltag_core::Error;
use spooltag_codec::TagImage;
use std::fmt;

/// Tagged result delivered upward when a session reaches a terminal state.
///
/// A failed operation is an outcome, not a panic or a bare `Err`: the
/// presentation layer renders every variant, and `Failed` carries the full
/// classified error (including derived protection errors) so it can show a
/// specific remediation.
///
/// Verification is asymmetric: a
/// [`VerifyMismatch`](SessionOutcome::VerifyMismatch) does not retroactively
/// turn the preceding write into a failure. The record is on the tag;
/// expected and actual content disagree, and both facts are reported.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Read completed; the raw image. Decoding into a record is the
    /// caller's responsibility (a blank tag is a normal read result).
    ReadOk { image: TagImage },

    /// All 28 record pages were written. Carries the written image so the
    /// caller can thread it into the follow-up verify session.
    WriteOk { written: TagImage },

    /// Capability container written, lock configuration cleared, user
    /// memory blanked.
    FormatOk,

    /// Lock diagnostics completed.
    LockReport(LockVerdict),

    /// Every compared byte matched the written image.
    VerifyOk,

    /// Read-back differed from the written image.
    VerifyMismatch {
        /// Number of differing bytes inside the comparison window.
        count: usize,
        /// Offset of the first divergent byte.
        first_offset: usize,
    },

    /// The operation aborted.
    Failed(Error),
}

impl SessionOutcome {
    /// True for every non-`Failed`, non-mismatch outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            SessionOutcome::Failed(_) | SessionOutcome::VerifyMismatch { .. }
        )
    }

    /// The error, when this outcome is a failure.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            SessionOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::ReadOk { image } => {
                write!(f, "read {} bytes", image.as_bytes().len())
            }
            SessionOutcome::WriteOk { .. } => write!(f, "write complete"),
            SessionOutcome::FormatOk => write!(f, "format complete"),
            SessionOutcome::LockReport(verdict) => write!(f, "lock status: {verdict}"),
            SessionOutcome::VerifyOk => write!(f, "verification passed"),
            SessionOutcome::VerifyMismatch { count, first_offset } => write!(
                f,
                "verification failed: {count} byte(s) differ, first at offset {first_offset}"
            ),
            SessionOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spooltag_core::TransportError;

    #[test]
    fn success_predicate() {
        assert!(SessionOutcome::FormatOk.is_success());
        assert!(SessionOutcome::VerifyOk.is_success());
        assert!(
            !SessionOutcome::VerifyMismatch {
                count: 1,
                first_offset: 50
            }
            .is_success()
        );
        assert!(!SessionOutcome::Failed(TransportError::nak(4).into()).is_success());
    }

    #[test]
    fn display_formats_mismatch_details() {
        let outcome = SessionOutcome::VerifyMismatch {
            count: 3,
            first_offset: 17,
        };
        assert_eq!(
            outcome.to_string(),
            "verification failed: 3 byte(s) differ, first at offset 17"
        );
    }

    #[test]
    fn error_accessor() {
        let err: Error = TransportError::timeout(100).into();
        let outcome = SessionOutcome::Failed(err.clone());
        assert_eq!(outcome.error(), Some(&err));
        assert_eq!(SessionOutcome::VerifyOk.error(), None);
    }
}
