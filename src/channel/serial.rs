//! Serial implementation of the command channel
//!
//! Wraps the `serialport` crate and provides async I/O using Tokio's
//! blocking task executor for the synchronous serial operations. The port
//! is opened with the fixed launch wire parameters (8N1, RTS and DTR
//! asserted) and the configured baud rate and read timeout.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serialport::{DataBits, Parity, SerialPort, StopBits};
use tokio::sync::Mutex;

use crate::channel::CommandChannel;
use crate::config::SerialSettings;
use crate::error::{LaunchError, LaunchResult};

/// Serial command channel for RS-232 laser heads.
pub struct SerialChannel {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    port_name: String,

    /// The open port (behind Arc<Mutex> so blocking I/O tasks can own a clone)
    port: Arc<Mutex<Box<dyn SerialPort>>>,
}

impl SerialChannel {
    /// Open the port and assert both handshake control lines.
    ///
    /// Any failure during setup drops the handle before the error
    /// propagates, so a half-configured port is never leaked to the caller.
    pub fn open(port_name: &str, settings: &SerialSettings) -> LaunchResult<Self> {
        let mut port = serialport::new(port_name, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|source| LaunchError::PortOpen {
                port: port_name.to_string(),
                source,
            })?;

        if let Err(source) = port
            .write_request_to_send(true)
            .and_then(|()| port.write_data_terminal_ready(true))
        {
            return Err(LaunchError::PortOpen {
                port: port_name.to_string(),
                source,
            });
        }

        debug!(
            "Opened serial port '{}' at {} baud",
            port_name, settings.baud_rate
        );

        Ok(Self {
            port_name: port_name.to_string(),
            port: Arc::new(Mutex::new(port)),
        })
    }

    /// The port identifier this channel is bound to.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl CommandChannel for SerialChannel {
    async fn write_command(&mut self, command: &str) -> LaunchResult<()> {
        let framed = format!("{command}\r\n");
        let command_for_log = command.to_string();
        let port = self.port.clone();

        // Execute blocking serial I/O on a dedicated thread
        tokio::task::spawn_blocking(move || -> LaunchResult<()> {
            let mut guard = port.blocking_lock();
            guard.write_all(framed.as_bytes())?;
            guard.flush()?;
            debug!("Sent serial command: {}", command_for_log);
            Ok(())
        })
        .await
        .map_err(|e| LaunchError::Channel(format!("serial write task failed: {e}")))?
    }

    async fn read_available_lines(&mut self) -> LaunchResult<Vec<String>> {
        let port = self.port.clone();

        tokio::task::spawn_blocking(move || -> LaunchResult<Vec<String>> {
            let mut guard = port.blocking_lock();
            let mut collected: Vec<u8> = Vec::new();
            let mut buffer = [0u8; 256];

            // Keep draining until the port timeout fires with nothing new.
            // The first read blocks for up to the full timeout, so a mute
            // device costs one timeout window and yields no lines.
            loop {
                match guard.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => collected.extend_from_slice(&buffer[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                    Err(e) => return Err(e.into()),
                }
            }

            if collected.is_empty() {
                return Ok(Vec::new());
            }

            let text = String::from_utf8_lossy(&collected);
            let lines = text
                .split_terminator('\n')
                .map(|line| line.to_string())
                .collect::<Vec<_>>();
            debug!("Received serial lines: {:?}", lines);
            Ok(lines)
        })
        .await
        .map_err(|e| LaunchError::Channel(format!("serial read task failed: {e}")))?
    }
}
