//! Per-model laser definitions
//!
//! A [`LaserModel`] is a purely declarative bundle: command vocabulary,
//! status query and encoding, fault-code map, transition table, and step
//! budget. It contains no control flow of its own; the generic
//! [`StateMachine`](crate::machine::StateMachine) consumes it. One model is
//! constructed per physical laser at launch time, selected through
//! [`LaserFamily`] from the family string the sled EEPROM reports.

pub mod cobolt;
pub mod coherent;

use std::collections::BTreeMap;

use crate::encode::StatusEncoding;
use crate::error::{LaunchError, LaunchResult};
use crate::protocol::Expected;
use crate::table::{FollowUp, TransitionTable};

/// Immutable per-model protocol definition.
#[derive(Debug, Clone)]
pub struct LaserModel {
    /// Short model name used in logs.
    pub name: &'static str,

    /// Initialization command sequence, paired with `init_ack`.
    pub init: Vec<String>,
    /// Acceptable acknowledgments, one entry per INIT command.
    pub init_ack: Vec<Expected>,

    /// Laser-on command sequence, paired with `on_ack`.
    pub on: Vec<String>,
    /// Acceptable acknowledgments, one entry per ON command.
    pub on_ack: Vec<Expected>,

    /// Laser-off command sequence, paired with `off_ack`.
    pub off: Vec<String>,
    /// Acceptable acknowledgments, one entry per OFF command.
    pub off_ack: Vec<Expected>,

    /// Status query command.
    pub check_status: String,
    /// Fault query command.
    pub check_error: String,
    /// Fault code reported by `check_error` mapped to a human reason.
    pub faults: BTreeMap<String, &'static str>,

    /// How raw status output becomes canonical tokens.
    pub status: StatusEncoding,
    /// Fully expanded transition table.
    pub table: TransitionTable,
    /// Maximum poll/transition iterations per run.
    pub step_budget: u32,
}

impl LaserModel {
    /// Resolve a table follow-up to the model's command sequence and its
    /// acknowledgment expectations.
    pub fn sequence(&self, follow_up: FollowUp) -> (&[String], &[Expected]) {
        match follow_up {
            FollowUp::Init => (&self.init, &self.init_ack),
            FollowUp::On => (&self.on, &self.on_ack),
            FollowUp::Off => (&self.off, &self.off_ack),
        }
    }

    /// Override the per-run iteration budget.
    pub fn with_step_budget(mut self, step_budget: u32) -> Self {
        self.step_budget = step_budget;
        self
    }
}

/// Owned command list from literals.
pub(crate) fn commands(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| (*t).to_string()).collect()
}

/// Fault map from literal (code, reason) pairs.
pub(crate) fn fault_map(pairs: &[(&str, &'static str)]) -> BTreeMap<String, &'static str> {
    pairs
        .iter()
        .map(|(code, reason)| ((*code).to_string(), *reason))
        .collect()
}

/// Laser families installed in launch sleds, as named by the sled EEPROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserFamily {
    /// Coherent Sapphire DPSS.
    Sapphire,
    /// Coherent Cube diode.
    Cube,
    /// Cobolt generation 3 DPSS (Jive/Fandango/Mambo).
    Cobolt3,
    /// Cobolt generation 4 DPSS (Jive/Fandango/Mambo, gen 4 electronics).
    Cobolt4,
    /// Externally managed gas laser; no serial protocol.
    External,
    /// Melles Griot 560; recognized but not driven.
    Mg560,
}

impl LaserFamily {
    /// Parse the family string stored in the sled EEPROM
    /// (e.g. `"SAPPHIRE"`, `"COBOLTJIVE4"`).
    pub fn from_eeprom(family: &str) -> LaunchResult<Self> {
        match family.trim().to_ascii_uppercase().as_str() {
            "SAPPHIRE" => Ok(Self::Sapphire),
            "CUBE" => Ok(Self::Cube),
            "COBOLTJIVE" | "COBOLTFANDANGO" | "COBOLTMAMBO" => Ok(Self::Cobolt3),
            "COBOLTJIVE4" | "COBOLTFANDANGO4" | "COBOLTMAMBO4" => Ok(Self::Cobolt4),
            "EXTERNAL" => Ok(Self::External),
            "MG560" => Ok(Self::Mg560),
            other => Err(LaunchError::UnknownFamily(other.to_string())),
        }
    }

    /// Build the protocol definition for this family.
    ///
    /// `None` for families that carry no serial protocol (External, MG560);
    /// the orchestrator skips their warm-up.
    pub fn model(self) -> LaunchResult<Option<LaserModel>> {
        match self {
            Self::Sapphire => coherent::sapphire().map(Some),
            Self::Cube => coherent::cube().map(Some),
            Self::Cobolt3 => cobolt::generation3().map(Some),
            Self::Cobolt4 => cobolt::generation4().map(Some),
            Self::External | Self::Mg560 => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_parsing_is_case_insensitive() {
        assert_eq!(
            LaserFamily::from_eeprom("sapphire").unwrap(),
            LaserFamily::Sapphire
        );
        assert_eq!(
            LaserFamily::from_eeprom(" COBOLTMAMBO4 ").unwrap(),
            LaserFamily::Cobolt4
        );
        assert_eq!(
            LaserFamily::from_eeprom("COBOLTJIVE").unwrap(),
            LaserFamily::Cobolt3
        );
    }

    #[test]
    fn test_unknown_family_rejected() {
        assert!(matches!(
            LaserFamily::from_eeprom("COMPASS"),
            Err(LaunchError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_protocol_free_families_yield_no_model() {
        assert!(LaserFamily::External.model().unwrap().is_none());
        assert!(LaserFamily::Mg560.model().unwrap().is_none());
        assert!(LaserFamily::Sapphire.model().unwrap().is_some());
    }

    #[test]
    fn test_step_budget_override() {
        let model = coherent::sapphire().unwrap().with_step_budget(7);
        assert_eq!(model.step_budget, 7);
    }
}
