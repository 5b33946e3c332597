//! Coherent Sapphire and Cube definitions
//!
//! Both heads speak the Coherent ASCII dialect: `?STA` reports a single
//! operating-status digit, `L=1`/`L=0` switch emission, and `>=0` turns
//! the command prompt off so replies stay machine-parseable. The status
//! digits are:
//!
//! | Status | Meaning                      |
//! |--------|------------------------------|
//! | 1-4    | Start-up/warm-up phases      |
//! | 5      | Power locked                 |
//! | 6      | Interlock open / fault       |

use crate::encode::{tokens_from_range, StatusEncoding};
use crate::error::LaunchResult;
use crate::models::{commands, fault_map, LaserModel};
use crate::protocol::accept;
use crate::table::{FollowUp, LaserState, Transition, TransitionTable};

use LaserState::{Error, InterlockOpen, PowerLocked, Unknown, WarmingUp};

/// Shared `?STA` digit transition table.
///
/// Status 6 while still Unknown is taken as an open interlock and answered
/// by re-initializing; the same digit once the interlock was already seen
/// open, or at any later point, aborts the run.
fn status_digit_table() -> LaunchResult<TransitionTable> {
    TransitionTable::from_shorthand([
        (Unknown, vec!["6".to_string()], Transition::to(InterlockOpen).then(FollowUp::Init)),
        (Unknown, tokens_from_range(1, 4), Transition::to(WarmingUp).then(FollowUp::On)),
        (Unknown, vec!["5".to_string()], Transition::to(PowerLocked)),
        (InterlockOpen, tokens_from_range(1, 4), Transition::to(WarmingUp).then(FollowUp::On)),
        (InterlockOpen, vec!["5".to_string()], Transition::to(PowerLocked)),
        (InterlockOpen, vec!["6".to_string()], Transition::fault(Error)),
        (WarmingUp, vec!["5".to_string()], Transition::to(PowerLocked)),
        (WarmingUp, tokens_from_range(1, 4), Transition::to(WarmingUp).then(FollowUp::On)),
        (WarmingUp, vec!["6".to_string()], Transition::fault(WarmingUp)),
        (PowerLocked, vec!["5".to_string()], Transition::to(PowerLocked)),
        (PowerLocked, vec!["6".to_string()], Transition::fault(PowerLocked)),
        (PowerLocked, tokens_from_range(1, 4), Transition::fault(PowerLocked)),
    ])
}

/// Coherent Sapphire DPSS.
pub fn sapphire() -> LaunchResult<LaserModel> {
    Ok(LaserModel {
        name: "sapphire",
        init: commands(&[">=0", "L=1"]),
        init_ack: vec![accept(&[">=0"]), accept(&["OK"])],
        on: commands(&["L=1"]),
        on_ack: vec![accept(&["OK"])],
        off: commands(&["L=0"]),
        off_ack: vec![accept(&["OK"])],
        check_status: "?STA".to_string(),
        check_error: "?F".to_string(),
        faults: fault_map(&[("0", "No fault"), ("1", "Interlock open")]),
        status: StatusEncoding::Digit { lo: 1, hi: 6 },
        table: status_digit_table()?,
        step_budget: 100,
    })
}

/// Coherent Cube diode head.
///
/// Same status domain as the Sapphire; the Cube additionally wants command
/// echo off (`E=0`) before the prompt suppression.
pub fn cube() -> LaunchResult<LaserModel> {
    Ok(LaserModel {
        name: "cube",
        init: commands(&["E=0", ">=0", "L=1"]),
        init_ack: vec![accept(&["OK"]), accept(&["OK"]), accept(&["OK"])],
        on: commands(&["L=1"]),
        on_ack: vec![accept(&["OK"])],
        off: commands(&["L=0"]),
        off_ack: vec![accept(&["OK"])],
        check_status: "?STA".to_string(),
        check_error: "?F".to_string(),
        faults: fault_map(&[("0", "No fault"), ("1", "Interlock open")]),
        status: StatusEncoding::Digit { lo: 1, hi: 6 },
        table: status_digit_table()?,
        step_budget: 100,
    })
}
