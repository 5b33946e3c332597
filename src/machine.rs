//! Generic warm-up state machine
//!
//! Model-agnostic engine that drives one laser from an unknown state to a
//! confirmed power lock, or to a diagnosed failure. Everything
//! device-specific lives in the [`LaserModel`](crate::models::LaserModel)
//! tables; the engine only issues the model's command sequences through
//! [`serial_check`], polls status, and walks the transition table with a
//! bounded step budget.

use std::fmt;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::channel::CommandChannel;
use crate::config::ProtocolTimings;
use crate::error::LaunchResult;
use crate::models::LaserModel;
use crate::protocol::{serial_check, CheckOutcome};
use crate::table::{LaserState, StatusToken};

/// Result of one status poll.
///
/// A poll that matches no acceptable token (or reads nothing) yields
/// [`StatusReading::Failed`], the protocol-mismatch sentinel. The sentinel
/// participates in the normal table lookup and, being absent from every
/// table, surfaces as an undefined transition if it persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReading {
    /// Canonicalized status token.
    Token(StatusToken),
    /// The read matched nothing the device may legally report.
    Failed,
}

impl fmt::Display for StatusReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "'{token}'"),
            Self::Failed => f.write_str("<failed status read>"),
        }
    }
}

/// Ordered sequence of visited states with immediately repeated entries
/// collapsed to one. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateHistory(Vec<LaserState>);

impl StateHistory {
    /// Append a state unless it equals the most recent entry.
    pub fn record(&mut self, state: LaserState) {
        if self.0.last() != Some(&state) {
            self.0.push(state);
        }
    }

    /// The collapsed sequence.
    pub fn states(&self) -> &[LaserState] {
        &self.0
    }
}

impl fmt::Display for StateHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for state in &self.0 {
            if !first {
                f.write_str(" -> ")?;
            }
            f.write_str(state.describe())?;
            first = false;
        }
        Ok(())
    }
}

/// Terminal outcome of one warm-up run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The laser reached power lock.
    Success,
    /// A defined transition was taken whose validity flag marks the laser
    /// as having reached an unsafe/erroneous condition.
    InvalidTransition {
        /// Fault reason read back from the head, when retrievable.
        fault: Option<String>,
    },
    /// No table entry exists for the observed (state, status) pair.
    UndefinedTransition {
        /// State the machine was in at lookup time.
        state: LaserState,
        /// The status reading that had no entry.
        reading: StatusReading,
    },
    /// The step budget ran out before any terminal condition.
    Timeout,
}

/// Outcome plus the collapsed state history, for the orchestrator to
/// inspect and log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// States visited, duplicates collapsed.
    pub history: StateHistory,
}

impl RunReport {
    /// True when the laser reached power lock.
    pub fn succeeded(&self) -> bool {
        self.outcome == RunOutcome::Success
    }
}

/// Table-driven warm-up engine for one laser.
///
/// Owns the model and its command channel for the lifetime of the laser; a
/// fresh history and step budget are created per [`run`](Self::run) call.
pub struct StateMachine<C: CommandChannel> {
    model: LaserModel,
    channel: C,
    command_delay: Duration,
}

impl<C: CommandChannel> StateMachine<C> {
    /// Pair a model with its exclusively owned channel, using default
    /// protocol pacing.
    pub fn new(model: LaserModel, channel: C) -> Self {
        Self::with_timings(model, channel, &ProtocolTimings::default())
    }

    /// Pair a model with its channel under explicit pacing settings.
    pub fn with_timings(model: LaserModel, channel: C, timings: &ProtocolTimings) -> Self {
        Self {
            model,
            channel,
            command_delay: timings.command_delay,
        }
    }

    /// The model this engine drives.
    pub fn model(&self) -> &LaserModel {
        &self.model
    }

    /// The owned channel, for transcript inspection in tests.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Drive the laser until it locks, faults, or the step budget runs out.
    ///
    /// Hard transport errors propagate as `Err`; every protocol-level
    /// ending is a [`RunOutcome`] in the report.
    pub async fn run(&mut self) -> LaunchResult<RunReport> {
        info!("[{}] starting warm-up sequence", self.model.name);

        serial_check(
            &mut self.channel,
            &self.model.init,
            &self.model.init_ack,
            self.command_delay,
        )
        .await?;

        let mut state = LaserState::Unknown;
        let mut history = StateHistory::default();
        history.record(state);

        let mut reading = self.query_status().await?;
        let mut budget = self.model.step_budget;

        while budget > 0 {
            debug!(
                "[{}] state: {}, status: {}, steps left: {}",
                self.model.name, state, reading, budget
            );

            let entry = match &reading {
                StatusReading::Token(token) => self.model.table.lookup(state, token),
                StatusReading::Failed => None,
            };
            let Some(entry) = entry.cloned() else {
                error!(
                    "[{}] no transition defined for state '{}' with status {}; history: {}",
                    self.model.name, state, reading, history
                );
                return Ok(RunReport {
                    outcome: RunOutcome::UndefinedTransition { state, reading },
                    history,
                });
            };

            state = entry.next;
            history.record(state);

            if !entry.valid {
                let fault = self.read_fault().await.unwrap_or_default();
                error!(
                    "[{}] reached unsafe condition '{}' (fault: {}); history: {}",
                    self.model.name,
                    state,
                    fault.as_deref().unwrap_or("not reported"),
                    history
                );
                return Ok(RunReport {
                    outcome: RunOutcome::InvalidTransition { fault },
                    history,
                });
            }

            if state == LaserState::PowerLocked {
                info!(
                    "[{}] warm-up completed successfully; history: {}",
                    self.model.name, history
                );
                return Ok(RunReport {
                    outcome: RunOutcome::Success,
                    history,
                });
            }

            if let Some(follow_up) = entry.follow_up {
                let (commands, acks) = self.model.sequence(follow_up);
                serial_check(&mut self.channel, commands, acks, self.command_delay).await?;

                reading = self.query_status().await?;
                if reading == StatusReading::Failed {
                    // One bounded retry; a second failure is carried into
                    // the next lookup and reported as undefined there.
                    warn!(
                        "[{}] status read failed after follow-up, retrying once",
                        self.model.name
                    );
                    reading = self.query_status().await?;
                }
            }

            budget -= 1;
        }

        warn!(
            "[{}] step budget exhausted before power lock; history: {}",
            self.model.name, history
        );
        Ok(RunReport {
            outcome: RunOutcome::Timeout,
            history,
        })
    }

    /// Query CHECK_ERROR and map the reported code through the model's
    /// fault table. `None` when the head reports nothing usable.
    pub async fn read_fault(&mut self) -> LaunchResult<Option<String>> {
        let expected = [Some(self.model.faults.keys().cloned().collect::<Vec<_>>())];
        let outcomes = serial_check(
            &mut self.channel,
            std::slice::from_ref(&self.model.check_error),
            &expected,
            self.command_delay,
        )
        .await?;

        Ok(match outcomes.into_iter().next() {
            Some(CheckOutcome::Matched(code)) => Some(
                self.model
                    .faults
                    .get(&code)
                    .map_or(code, |reason| (*reason).to_string()),
            ),
            _ => None,
        })
    }

    /// Issue the model's laser-off sequence.
    pub async fn turn_off(&mut self) -> LaunchResult<Vec<CheckOutcome>> {
        info!("[{}] turning laser off", self.model.name);
        serial_check(
            &mut self.channel,
            &self.model.off,
            &self.model.off_ack,
            self.command_delay,
        )
        .await
    }

    async fn query_status(&mut self) -> LaunchResult<StatusReading> {
        let expected = [Some(self.model.status.candidates())];
        let outcomes = serial_check(
            &mut self.channel,
            std::slice::from_ref(&self.model.check_status),
            &expected,
            self.command_delay,
        )
        .await?;

        Ok(match outcomes.into_iter().next() {
            Some(CheckOutcome::Matched(raw)) => match self.model.status.canonicalize(&raw) {
                Some(token) => StatusReading::Token(token),
                None => StatusReading::Failed,
            },
            _ => StatusReading::Failed,
        })
    }
}
