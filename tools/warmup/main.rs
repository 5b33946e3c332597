/*
 * Laser warm-up runner
 *
 * Opens a serial port, selects the laser model for the family string the
 * sled EEPROM reported, and drives the warm-up state machine to completion.
 *
 * SAFETY WARNING:
 * This tool turns lasers on. Make sure the launch interlocks and shutter
 * are in a safe state before pointing it at a port, and never run it
 * against a port whose device identity is unknown — junk commands at a
 * mismatched baud rate can do real harm on high-power heads.
 */

use anyhow::{bail, Context, Result};
use clap::Parser;
use laser_launch::channel::SerialChannel;
use laser_launch::config::LaunchSettings;
use laser_launch::machine::{RunOutcome, StateMachine};
use laser_launch::models::LaserFamily;

#[derive(Parser)]
#[command(
    name = "warmup",
    about = "Power up one launch laser and wait for power lock"
)]
struct Args {
    /// Serial port the laser is attached to (e.g. /dev/ttyUSB0, COM3)
    #[arg(long)]
    port: String,

    /// Laser family string as stored in the sled EEPROM
    /// (e.g. SAPPHIRE, CUBE, COBOLTJIVE4)
    #[arg(long)]
    family: String,

    /// Optional TOML settings file overriding serial/protocol timings
    #[arg(long)]
    config: Option<String>,

    /// Override the per-run step budget
    #[arg(long)]
    step_budget: Option<u32>,

    /// Turn the laser off after the run instead of leaving it locked
    #[arg(long)]
    off: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = LaunchSettings::new(args.config.as_deref())?;
    let family = LaserFamily::from_eeprom(&args.family)?;

    let Some(mut model) = family.model()? else {
        println!(
            "Family {:?} carries no serial protocol; nothing to warm up",
            family
        );
        return Ok(());
    };
    if let Some(steps) = args.step_budget {
        model = model.with_step_budget(steps);
    }

    let channel = SerialChannel::open(&args.port, &settings.serial)
        .with_context(|| format!("cannot drive laser on '{}'", args.port))?;
    let mut machine = StateMachine::with_timings(model, channel, &settings.protocol);

    let report = machine.run().await?;
    println!("History: {}", report.history);

    if args.off {
        machine.turn_off().await?;
        println!("Laser turned off");
    }

    match &report.outcome {
        RunOutcome::Success => {
            println!("Laser reached power lock");
            Ok(())
        }
        RunOutcome::InvalidTransition { fault } => {
            bail!(
                "laser reached an unsafe condition (fault: {})",
                fault.as_deref().unwrap_or("not reported")
            )
        }
        RunOutcome::UndefinedTransition { state, reading } => {
            bail!("no transition defined for state '{state}' with status {reading}")
        }
        RunOutcome::Timeout => {
            bail!("step budget exhausted before power lock (laser may still be warming up)")
        }
    }
}
