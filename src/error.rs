//! Custom error types for the crate.
//!
//! This module defines the primary error type, `LaunchError`, used across the
//! laser warm-up stack. Using the `thiserror` crate, it provides a
//! centralized and consistent way to handle the different kinds of errors
//! that can occur, from serial I/O and configuration issues to malformed
//! per-model transition tables.
//!
//! Protocol-level conditions (a response that matches no expected token, a
//! silent device, an undefined transition) are deliberately NOT errors: they
//! are in-band outcomes carried by [`crate::protocol::CheckOutcome`] and
//! [`crate::machine::RunOutcome`], because the warm-up engine must keep
//! driving heterogeneous, sometimes mute devices. `LaunchError` is reserved
//! for hard failures: the transport is gone, the configuration is unusable,
//! or a model's declarative tables are internally inconsistent.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type LaunchResult<T> = std::result::Result<T, LaunchError>;

/// Hard failures of the warm-up stack.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "instrument_serial")]
    #[error("Failed to open serial port '{port}': {source}")]
    PortOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Command channel error: {0}")]
    Channel(String),

    #[error("Invalid character '{found}' in don't-care pattern '{pattern}'")]
    Pattern { pattern: String, found: char },

    #[error("Malformed transition table: {0}")]
    Table(String),

    #[error("Unknown laser family '{0}'")]
    UnknownFamily(String),
}
