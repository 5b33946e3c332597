//! Cobolt generation 3 and 4 definitions
//!
//! Cobolt DPSS heads report status through `leds?`, a decimal integer
//! whose bits mirror the front-panel LEDs:
//!
//! | Bit (MSB first) | LED          |
//! |-----------------|--------------|
//! | 3               | Power on     |
//! | 2               | Stabilizing  |
//! | 1               | Laser on     |
//! | 0               | Error        |
//!
//! Individual bits are independently meaningful, so the transition table
//! is declared with don't-care patterns: `10xx` is "powered, lock
//! reached", `11xx` is "powered, still stabilizing", `0xxx` is "no power /
//! interlock".
//!
//! Generation 4 electronics gate emission behind the key-switch and TEC
//! enables (`lten1`, `xten1`); generation 3 heads only need autostart and
//! laser-on.

use crate::encode::{expand_dont_care, StatusEncoding};
use crate::error::LaunchResult;
use crate::models::{commands, fault_map, LaserModel};
use crate::protocol::{accept, Expected};
use crate::table::{FollowUp, LaserState, Transition, TransitionTable};

use LaserState::{Error, InterlockOpen, PowerLocked, Unknown, WarmingUp};

/// Shared `leds?` bitmask transition table.
///
/// No entry is declared for `01xx` outside the Unknown state: a lit laser
/// LED without the power LED cannot legally occur once the head has been
/// observed, and an undefined transition is the right diagnosis if it does.
fn led_table() -> LaunchResult<TransitionTable> {
    TransitionTable::from_shorthand([
        (Unknown, expand_dont_care("0xxx")?, Transition::to(InterlockOpen).then(FollowUp::Init)),
        (Unknown, expand_dont_care("11xx")?, Transition::to(WarmingUp)),
        (Unknown, expand_dont_care("10xx")?, Transition::to(PowerLocked)),
        (InterlockOpen, expand_dont_care("11xx")?, Transition::to(WarmingUp).then(FollowUp::On)),
        (InterlockOpen, expand_dont_care("10xx")?, Transition::to(WarmingUp)),
        (InterlockOpen, expand_dont_care("00xx")?, Transition::fault(Error)),
        (WarmingUp, expand_dont_care("10xx")?, Transition::to(PowerLocked)),
        (WarmingUp, expand_dont_care("11xx")?, Transition::to(WarmingUp)),
        (WarmingUp, expand_dont_care("0xxx")?, Transition::fault(Error)),
        (PowerLocked, expand_dont_care("10xx")?, Transition::to(PowerLocked)),
        (PowerLocked, expand_dont_care("11xx")?, Transition::fault(Error)),
        (PowerLocked, expand_dont_care("0xxx")?, Transition::fault(Error)),
    ])
}

fn cobolt_faults() -> std::collections::BTreeMap<String, &'static str> {
    fault_map(&[
        ("0", "No error"),
        ("1", "Temperature error"),
        ("3", "Interlock opened"),
        ("4", "Constant power time out"),
    ])
}

fn ack_each(count: usize) -> Vec<Expected> {
    (0..count).map(|_| accept(&["OK"])).collect()
}

/// Cobolt generation 4 head (Jive/Fandango/Mambo).
pub fn generation4() -> LaunchResult<LaserModel> {
    let on = commands(&["lten1", "xten1", "@cob 1", "l1"]);
    Ok(LaserModel {
        name: "cobolt4",
        init: commands(&["cf"]),
        init_ack: ack_each(1),
        on_ack: ack_each(on.len()),
        on,
        off: commands(&["l0"]),
        off_ack: ack_each(1),
        check_status: "leds?".to_string(),
        check_error: "f?".to_string(),
        faults: cobolt_faults(),
        status: StatusEncoding::Bits { width: 4 },
        table: led_table()?,
        step_budget: 100,
    })
}

/// Cobolt generation 3 head (Jive/Fandango/Mambo).
pub fn generation3() -> LaunchResult<LaserModel> {
    let on = commands(&["@cob 1", "l1"]);
    Ok(LaserModel {
        name: "cobolt3",
        init: commands(&["cf"]),
        init_ack: ack_each(1),
        on_ack: ack_each(on.len()),
        on,
        off: commands(&["l0"]),
        off_ack: ack_each(1),
        check_status: "leds?".to_string(),
        check_error: "f?".to_string(),
        faults: cobolt_faults(),
        status: StatusEncoding::Bits { width: 4 },
        table: led_table()?,
        step_budget: 100,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::StatusToken;

    #[test]
    fn test_unknown_state_covers_every_bitmask() {
        let model = generation4().unwrap();
        for value in 0..16u32 {
            let token = StatusToken::new(format!("{value:04b}"));
            assert!(
                model.table.lookup(Unknown, &token).is_some(),
                "missing entry for Unknown / {token}"
            );
        }
    }

    #[test]
    fn test_locked_group_from_unknown() {
        let model = generation4().unwrap();
        for bits in ["1000", "1001", "1010", "1011"] {
            let entry = model.table.lookup(Unknown, &StatusToken::new(bits)).unwrap();
            assert_eq!(entry.next, PowerLocked);
            assert!(entry.valid);
        }
    }

    #[test]
    fn test_power_loss_after_lock_is_fault() {
        let model = generation4().unwrap();
        for bits in ["0000", "0111", "1100", "1111"] {
            let entry = model
                .table
                .lookup(PowerLocked, &StatusToken::new(bits))
                .unwrap();
            assert!(!entry.valid, "lock loss via {bits} must abort");
        }
    }

    #[test]
    fn test_interlock_state_is_deliberately_partial() {
        let model = generation4().unwrap();
        assert!(model
            .table
            .lookup(InterlockOpen, &StatusToken::new("0100"))
            .is_none());
    }

    #[test]
    fn test_generation3_drops_gen4_enables() {
        let gen3 = generation3().unwrap();
        let gen4 = generation4().unwrap();
        assert!(!gen3.on.contains(&"lten1".to_string()));
        assert!(gen4.on.contains(&"lten1".to_string()));
        assert_eq!(gen3.table.len(), gen4.table.len());
    }
}
