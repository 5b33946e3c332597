//! Command channel implementations
//!
//! This module contains implementations of the [`CommandChannel`] trait,
//! the low-level line-oriented I/O abstraction the protocol engine drives.
//! The real channel wraps a serial port; the mock channel replays scripted
//! device transcripts for tests.

pub mod mock;
#[cfg(feature = "instrument_serial")]
pub mod serial;

pub use mock::MockChannel;
#[cfg(feature = "instrument_serial")]
pub use serial::SerialChannel;

use async_trait::async_trait;

use crate::error::LaunchResult;

/// Transport junk stripped from response lines before token comparison.
pub const JUNK_CHARACTERS: &[char] = &['\r', '\n', '\0'];

/// Strip leading/trailing carriage returns, line feeds and NULs from a raw
/// response line.
pub fn strip_junk(line: &str) -> &str {
    line.trim_matches(JUNK_CHARACTERS)
}

/// A line-oriented, bidirectional byte channel to one laser.
///
/// The channel is exclusively owned by one laser driver for its entire
/// lifetime; implementations need not be shareable. Commands are framed with
/// CRLF by the implementation; responses are returned as raw lines (junk
/// characters included) and stripped by the protocol layer.
#[async_trait]
pub trait CommandChannel: Send {
    /// Write one command, CRLF-terminated.
    async fn write_command(&mut self, command: &str) -> LaunchResult<()>;

    /// Drain every response line the device has produced within the read
    /// timeout window. An empty vector means the device stayed silent,
    /// which the protocol layer treats as a defined outcome.
    async fn read_available_lines(&mut self) -> LaunchResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_junk_both_ends() {
        assert_eq!(strip_junk("\r\n5\r\n"), "5");
        assert_eq!(strip_junk("OK\r\n\0"), "OK");
        assert_eq!(strip_junk("\0\0"), "");
    }

    #[test]
    fn test_strip_junk_keeps_interior_characters() {
        assert_eq!(strip_junk("Interlock open\r\n"), "Interlock open");
    }
}
