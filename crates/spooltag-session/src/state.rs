//! Session state machine.
//!
//! One proximity session moves through these states:
//!
//! ```text
//! Idle → Detecting → Identified → { Reading | Writing | Formatting
//!                                   | CheckingLock | Verifying }
//!                                → Completed | Failed
//! ```
//!
//! `Detecting` is entered when the proximity session opens; `Identified`
//! once the tag answers the identity exchange. The per-operation state is
//! chosen by the request that opened the session. `Completed` and `Failed`
//! are terminal; both close the session.
//!
//! The machine enforces valid transitions and keeps a bounded transition
//! history for diagnostics.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use spooltag_core::{Error, Result};

/// Maximum number of state transitions kept in history.
///
/// A complete session is at most five transitions, so this covers roughly
/// a dozen sessions of context when debugging a flaky tag.
const MAX_HISTORY_SIZE: usize = 64;

/// States of one tag proximity session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session open; waiting for an operation request.
    Idle,

    /// Proximity session open, polling for a tag in the field.
    Detecting,

    /// A tag answered the identity exchange.
    Identified,

    /// Sequentially reading the user-memory page run.
    Reading,

    /// Writing the 28 record pages.
    Writing,

    /// Writing the capability container, clearing lock configuration, and
    /// blanking user memory.
    Formatting,

    /// Running lock diagnostics.
    CheckingLock,

    /// Reading back pages and comparing against the last written image.
    Verifying,

    /// Terminal: the operation finished and produced an outcome.
    Completed,

    /// Terminal: the operation aborted with an error.
    Failed,
}

impl SessionState {
    /// Check if a transition to `target` is legal from this state.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Idle, Detecting)
                | (Detecting, Identified | Failed)
                | (
                    Identified,
                    Reading | Writing | Formatting | CheckingLock | Verifying
                )
                | (Reading | Writing | Formatting | CheckingLock | Verifying, Completed | Failed)
        )
    }

    /// True for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "Idle",
            SessionState::Detecting => "Detecting",
            SessionState::Identified => "Identified",
            SessionState::Reading => "Reading",
            SessionState::Writing => "Writing",
            SessionState::Formatting => "Formatting",
            SessionState::CheckingLock => "CheckingLock",
            SessionState::Verifying => "Verifying",
            SessionState::Completed => "Completed",
            SessionState::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// A single recorded transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,

    /// When the transition occurred. Not serialized (`Instant` is
    /// process-specific); deserialization stamps the current time.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Elapsed time since this transition.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Validated state machine for one session.
///
/// Not thread-safe: a session is single-threaded cooperative, with exactly
/// one command/response exchange outstanding at any time.
#[derive(Debug)]
pub struct StateMachine {
    current_state: SessionState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// New machine in `Idle`.
    pub fn new() -> Self {
        Self {
            current_state: SessionState::Idle,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> &SessionState {
        &self.current_state
    }

    /// Time spent in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// The transition history, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Transition to `new_state`, validating the edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] when the edge is not part
    /// of the session flow.
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());
        Ok(transition)
    }

    /// Force the machine back to `Idle` regardless of current state.
    ///
    /// Used between sessions and for error recovery.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::new(self.current_state, SessionState::Idle);
        self.perform_state_change(SessionState::Idle, transition.clone());
        transition
    }

    fn perform_state_change(&mut self, new_state: SessionState, transition: StateTransition) {
        self.current_state = new_state;
        self.state_entered_at = Instant::now();
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
