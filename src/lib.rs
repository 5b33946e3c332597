//! Serial warm-up control for the lasers of a microscopy illumination
//! launch.
//!
//! This library powers up continuous-wave diode and DPSS laser heads over
//! their serial command interfaces, verifying that each one progresses
//! through a safe warm-up sequence to a confirmed power lock, or reporting
//! a diagnosable failure if it does not. Heterogeneous command dialects
//! (Coherent Sapphire/Cube, Cobolt generation 3/4) are all driven by one
//! table-driven engine; the per-model differences live entirely in
//! declarative [`models`] data.
//!
//! The library consumes an already-open [`channel::CommandChannel`] bound
//! to a port discovered by the surrounding launch software, and produces a
//! typed [`machine::RunReport`]. Interlock/shutter hardware, EEPROM laser
//! identity and port discovery are the callers' concerns.

pub mod channel;
pub mod config;
pub mod encode;
pub mod error;
pub mod machine;
pub mod models;
pub mod protocol;
pub mod table;
