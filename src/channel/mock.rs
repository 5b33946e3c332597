//! Scripted mock channel for tests
//!
//! Replays canned device transcripts: each expected command is given a
//! queue of response line sets (consumed one per read) and optionally a
//! sticky fallback used once the queue runs dry. Commands with no script
//! read back as a silent device. Every write is recorded so tests can
//! assert on the exact command traffic.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::channel::CommandChannel;
use crate::error::LaunchResult;

/// In-memory [`CommandChannel`] with scripted responses.
#[derive(Debug, Default)]
pub struct MockChannel {
    queued: HashMap<String, VecDeque<Vec<String>>>,
    fallback: HashMap<String, Vec<String>>,
    sent: Vec<String>,
}

impl MockChannel {
    /// New channel with no scripts: every command reads back silent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one set of response lines for the next read following
    /// `command`. Repeated calls for the same command queue in order.
    pub fn on(mut self, command: &str, lines: &[&str]) -> Self {
        self.queued
            .entry(command.to_string())
            .or_default()
            .push_back(lines.iter().map(|l| (*l).to_string()).collect());
        self
    }

    /// Respond to `command` with `lines` whenever no queued response is
    /// left for it.
    pub fn always(mut self, command: &str, lines: &[&str]) -> Self {
        self.fallback.insert(
            command.to_string(),
            lines.iter().map(|l| (*l).to_string()).collect(),
        );
        self
    }

    /// Queue a silent (no output) response for `command`.
    pub fn on_silent(self, command: &str) -> Self {
        self.on(command, &[])
    }

    /// Every command written so far, in order.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn write_command(&mut self, command: &str) -> LaunchResult<()> {
        self.sent.push(command.to_string());
        Ok(())
    }

    async fn read_available_lines(&mut self) -> LaunchResult<Vec<String>> {
        let Some(command) = self.sent.last() else {
            return Ok(Vec::new());
        };

        if let Some(queue) = self.queued.get_mut(command) {
            if let Some(lines) = queue.pop_front() {
                return Ok(lines);
            }
        }

        Ok(self.fallback.get(command).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_consumed_in_order() {
        let mut channel = MockChannel::new()
            .on("?STA", &["2\r\n"])
            .on("?STA", &["5\r\n"]);

        channel.write_command("?STA").await.unwrap();
        assert_eq!(channel.read_available_lines().await.unwrap(), vec!["2\r\n"]);
        channel.write_command("?STA").await.unwrap();
        assert_eq!(channel.read_available_lines().await.unwrap(), vec!["5\r\n"]);
        // Queue dry, no fallback: silent
        channel.write_command("?STA").await.unwrap();
        assert!(channel.read_available_lines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_after_queue_dry() {
        let mut channel = MockChannel::new()
            .on("leds?", &["12\r\n"])
            .always("leds?", &["10\r\n"]);

        channel.write_command("leds?").await.unwrap();
        assert_eq!(
            channel.read_available_lines().await.unwrap(),
            vec!["12\r\n"]
        );
        channel.write_command("leds?").await.unwrap();
        assert_eq!(
            channel.read_available_lines().await.unwrap(),
            vec!["10\r\n"]
        );
        channel.write_command("leds?").await.unwrap();
        assert_eq!(
            channel.read_available_lines().await.unwrap(),
            vec!["10\r\n"]
        );
    }

    #[tokio::test]
    async fn test_unscripted_command_is_silent_and_recorded() {
        let mut channel = MockChannel::new();
        channel.write_command("L=1").await.unwrap();
        assert!(channel.read_available_lines().await.unwrap().is_empty());
        assert_eq!(channel.sent(), &["L=1".to_string()]);
    }
}
