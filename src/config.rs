//! Runtime settings for the warm-up stack.
//!
//! Everything here has a default that reproduces the fixed wire parameters
//! of the launch hardware (19200 baud 8N1, 1 s read timeout), so no
//! configuration file is required. A TOML file and/or `LAUNCH_*` environment
//! variables can override the timings for bench debugging, e.g.:
//!
//! ```toml
//! [protocol]
//! command_delay = "50ms"
//! step_budget = 20
//! ```

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::LaunchResult;

/// Serial port parameters for the laser command channel.
///
/// Data bits, parity and stop bits are not configurable: every supported
/// laser family speaks 8N1 and the channel hard-codes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Line speed shared by all supported laser families.
    pub baud_rate: u32,

    /// Blocking read timeout on the port; a silent device is detected by
    /// this expiring with nothing buffered.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 19200,
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Pacing of the command/response exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProtocolTimings {
    /// Settle time between writing a command and draining the response.
    #[serde(with = "humantime_serde")]
    pub command_delay: Duration,

    /// Default poll/transition iteration budget for models that do not
    /// declare their own.
    pub step_budget: u32,
}

impl Default for ProtocolTimings {
    fn default() -> Self {
        Self {
            command_delay: Duration::from_millis(10),
            step_budget: 100,
        }
    }
}

/// Top-level settings bundle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Serial port parameters.
    pub serial: SerialSettings,
    /// Protocol pacing.
    pub protocol: ProtocolTimings,
}

impl LaunchSettings {
    /// Load settings, optionally merging a TOML file over the defaults.
    ///
    /// Environment variables prefixed `LAUNCH` (e.g.
    /// `LAUNCH_PROTOCOL__STEP_BUDGET=20`) override both.
    pub fn new(config_path: Option<&str>) -> LaunchResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }
        let cfg = builder
            .add_source(Environment::with_prefix("LAUNCH").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_wire_parameters() {
        let settings = LaunchSettings::default();
        assert_eq!(settings.serial.baud_rate, 19200);
        assert_eq!(settings.serial.read_timeout, Duration::from_secs(1));
        assert_eq!(settings.protocol.command_delay, Duration::from_millis(10));
        assert_eq!(settings.protocol.step_budget, 100);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = LaunchSettings::new(None).unwrap();
        assert_eq!(settings.serial.baud_rate, 19200);
        assert_eq!(settings.protocol.step_budget, 100);
    }

    #[test]
    fn test_toml_file_overrides_timings() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[protocol]\ncommand_delay = \"50ms\"\nstep_budget = 20\n\n[serial]\nread_timeout = \"2s\"\n"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let settings = LaunchSettings::new(Some(&path)).unwrap();
        assert_eq!(settings.protocol.command_delay, Duration::from_millis(50));
        assert_eq!(settings.protocol.step_budget, 20);
        assert_eq!(settings.serial.read_timeout, Duration::from_secs(2));
        // Untouched section keeps its default
        assert_eq!(settings.serial.baud_rate, 19200);
    }
}
