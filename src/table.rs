//! Warm-up states and the per-model transition table.
//!
//! The table maps (current state, status token) to a transition record:
//! the next state, whether reaching it is acceptable, and an optional
//! follow-up command sequence. Models declare their tables in grouped
//! shorthand (digit ranges, don't-care bit patterns) which is expanded
//! exactly once into singleton entries; after construction the table is
//! read-only.

use std::collections::HashMap;
use std::fmt;

use crate::error::{LaunchError, LaunchResult};

/// Warm-up state of one laser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaserState {
    /// No status has been interpreted yet.
    Unknown,
    /// The safety interlock is open; emission is forbidden.
    InterlockOpen,
    /// The head is stabilizing toward its power lock point.
    WarmingUp,
    /// Output is stable and usable. Terminal success state.
    PowerLocked,
    /// The head reported a fault condition. Terminal failure state.
    Error,
}

impl LaserState {
    /// Human-readable description used in history dumps and logs.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown laser state",
            Self::InterlockOpen => "Interlock open",
            Self::WarmingUp => "Warming up",
            Self::PowerLocked => "Power locked",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for LaserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Canonical string form of one polled device-status reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusToken(String);

impl StatusToken {
    /// Wrap a canonical token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite lookup key: the state the machine is in and the status the
/// device reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    /// Machine state at lookup time.
    pub state: LaserState,
    /// Canonical status token observed.
    pub token: StatusToken,
}

/// Command sequence a transition asks the engine to issue before the next
/// status poll. Resolved against the owning model's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// The model's initialization sequence.
    Init,
    /// The model's laser-on sequence.
    On,
    /// The model's laser-off sequence.
    Off,
}

/// One transition record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State the machine moves to.
    pub next: LaserState,
    /// False marks a destination that must abort the run as a
    /// safety/error condition even though the table defines it.
    pub valid: bool,
    /// Command sequence to issue after taking this transition.
    pub follow_up: Option<FollowUp>,
}

impl Transition {
    /// Acceptable transition to `next`.
    pub fn to(next: LaserState) -> Self {
        Self {
            next,
            valid: true,
            follow_up: None,
        }
    }

    /// Transition to `next` that aborts the run as unsafe/erroneous.
    pub fn fault(next: LaserState) -> Self {
        Self {
            next,
            valid: false,
            follow_up: None,
        }
    }

    /// Attach a follow-up command sequence.
    pub fn then(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }
}

/// Fully expanded, read-only transition table for one laser model.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    entries: HashMap<TransitionKey, Transition>,
}

impl TransitionTable {
    /// Expand a grouped shorthand table into singleton entries.
    ///
    /// Each shorthand row pairs a state and a token group (from
    /// [`crate::encode::expand_dont_care`] or
    /// [`crate::encode::tokens_from_range`]) with one transition record;
    /// every token in the group receives an identical copy. Groups for the
    /// same state must be disjoint: a duplicate (state, token) pair means
    /// the model's table is malformed.
    pub fn from_shorthand(
        shorthand: impl IntoIterator<Item = (LaserState, Vec<String>, Transition)>,
    ) -> LaunchResult<Self> {
        let mut entries = HashMap::new();
        for (state, tokens, transition) in shorthand {
            for token in tokens {
                let key = TransitionKey {
                    state,
                    token: StatusToken::new(token),
                };
                if let Some(previous) = entries.insert(key.clone(), transition.clone()) {
                    return Err(LaunchError::Table(format!(
                        "duplicate entry for state {:?} with status '{}' (was {:?})",
                        key.state, key.token, previous
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// Look up the transition for (state, token). `None` means the pair is
    /// undefined, which the engine reports as a fatal protocol error.
    pub fn lookup(&self, state: LaserState, token: &StatusToken) -> Option<&Transition> {
        self.entries.get(&TransitionKey {
            state,
            token: token.clone(),
        })
    }

    /// Number of singleton entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
