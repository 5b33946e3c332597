//! Command/response exchange
//!
//! `serial_check` is the single primitive every higher layer uses to talk
//! to a laser: write an ordered list of commands and audit each response
//! against the caller's expectations. Mismatches and silence are recorded
//! per command, never raised, because the launch drives a mix of chatty
//! and mute devices over the same engine.

use std::time::Duration;

use log::{debug, error, warn};

use crate::channel::{strip_junk, CommandChannel};
use crate::error::LaunchResult;

/// Acceptable response tokens for one command, in preference order.
/// `None` means the caller stated no expectation at all, which aborts the
/// audit (see [`serial_check`]).
pub type Expected = Option<Vec<String>>;

/// Convenience constructor for a single-command expectation list.
pub fn accept(tokens: &[&str]) -> Expected {
    Some(tokens.iter().map(|t| (*t).to_string()).collect())
}

/// Audited outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A response line matched this expected token.
    Matched(String),
    /// The device produced no output where none was required.
    Silent,
    /// Output arrived but matched none of the expected tokens.
    Mismatch,
}

/// Send `commands` in order, comparing each response against the matching
/// entry of `expected` (first candidate match wins). A shorter `expected`
/// list is right-padded with `None`.
///
/// Per command: the command is written, the device is given `command_delay`
/// to respond, and all available lines are drained. A command whose
/// expectation is `None` terminates the whole call after its write,
/// returning only the outcomes accumulated so far — callers must always
/// supply an expectation to get full per-command auditing, and the warning
/// flags the ones that do not. Silence is recorded as
/// [`CheckOutcome::Silent`] and is not an error; some heads never
/// acknowledge set commands.
pub async fn serial_check(
    channel: &mut dyn CommandChannel,
    commands: &[String],
    expected: &[Expected],
    command_delay: Duration,
) -> LaunchResult<Vec<CheckOutcome>> {
    let mut outcomes = Vec::with_capacity(commands.len());

    for (i, command) in commands.iter().enumerate() {
        channel.write_command(command).await?;
        tokio::time::sleep(command_delay).await;
        let lines = channel.read_available_lines().await?;

        let Some(accepted) = expected.get(i).and_then(|e| e.as_deref()) else {
            warn!(
                "serial_check: output of '{}' was {:?}, but no expected output was stated",
                command, lines
            );
            return Ok(outcomes);
        };

        if lines.is_empty() {
            debug!("serial_check: no output for '{}', accepted as silent", command);
            outcomes.push(CheckOutcome::Silent);
            continue;
        }

        let matched = lines
            .iter()
            .map(|line| strip_junk(line))
            .find(|line| accepted.iter().any(|token| token.as_str() == *line));

        match matched {
            Some(token) => {
                debug!("serial_check: '{}' answered '{}'", command, token);
                outcomes.push(CheckOutcome::Matched(token.to_string()));
            }
            None => {
                error!(
                    "serial_check: expected one of {:?} for '{}' but got {:?}",
                    accepted, command, lines
                );
                outcomes.push(CheckOutcome::Mismatch);
            }
        }
    }

    Ok(outcomes)
}
