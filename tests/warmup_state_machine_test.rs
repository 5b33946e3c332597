//! Warm-up engine scenarios driven end-to-end over a scripted mock channel.

use std::time::Duration;

use laser_launch::channel::MockChannel;
use laser_launch::config::ProtocolTimings;
use laser_launch::machine::{RunOutcome, StateMachine, StatusReading};
use laser_launch::models::{cobolt, coherent};
use laser_launch::table::{LaserState, StatusToken};

fn fast() -> ProtocolTimings {
    ProtocolTimings {
        command_delay: Duration::ZERO,
        step_budget: 100,
    }
}

#[tokio::test]
async fn test_sapphire_already_locked_reports_success() {
    let channel = MockChannel::new().on("?STA", &["5\r\n"]);
    let mut machine = StateMachine::with_timings(coherent::sapphire().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert!(report.succeeded());
    assert_eq!(
        report.history.states(),
        &[LaserState::Unknown, LaserState::PowerLocked]
    );
    assert_eq!(
        machine.channel().sent(),
        &[">=0".to_string(), "L=1".to_string(), "?STA".to_string()]
    );
}

#[tokio::test]
async fn test_sapphire_interlock_stays_open_reports_invalid_transition() {
    let channel = MockChannel::new()
        .on("?STA", &["6\r\n"])
        .on("?STA", &["6\r\n"])
        .on("?F", &["1\r\n"]);
    let mut machine = StateMachine::with_timings(coherent::sapphire().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::InvalidTransition {
            fault: Some("Interlock open".to_string())
        }
    );
    assert_eq!(
        report.history.states(),
        &[
            LaserState::Unknown,
            LaserState::InterlockOpen,
            LaserState::Error
        ]
    );
}

#[tokio::test]
async fn test_sapphire_full_warmup_path() {
    let channel = MockChannel::new()
        .on("?STA", &["6\r\n"])
        .on("?STA", &["2\r\n"])
        .on("?STA", &["5\r\n"]);
    let mut machine = StateMachine::with_timings(coherent::sapphire().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert!(report.succeeded());
    assert_eq!(
        report.history.states(),
        &[
            LaserState::Unknown,
            LaserState::InterlockOpen,
            LaserState::WarmingUp,
            LaserState::PowerLocked
        ]
    );
}

#[tokio::test]
async fn test_cobolt4_locked_bitmask_inside_dont_care_group() {
    // leds? reports decimal 10 = binary 1010, inside the "10xx" lock group
    let channel = MockChannel::new()
        .always("cf", &["OK\r\n"])
        .on("leds?", &["10\r\n"]);
    let mut machine = StateMachine::with_timings(cobolt::generation4().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert!(report.succeeded());
    assert_eq!(
        report.history.states(),
        &[LaserState::Unknown, LaserState::PowerLocked]
    );
}

#[tokio::test]
async fn test_cobolt4_warmup_issues_full_on_sequence() {
    let channel = MockChannel::new()
        .always("cf", &["OK\r\n"])
        .always("lten1", &["OK\r\n"])
        .always("xten1", &["OK\r\n"])
        .always("@cob 1", &["OK\r\n"])
        .always("l1", &["OK\r\n"])
        .on("leds?", &["0\r\n"])
        .on("leds?", &["12\r\n"])
        .on("leds?", &["10\r\n"]);
    let mut machine = StateMachine::with_timings(cobolt::generation4().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert!(report.succeeded());
    assert_eq!(
        report.history.states(),
        &[
            LaserState::Unknown,
            LaserState::InterlockOpen,
            LaserState::WarmingUp,
            LaserState::PowerLocked
        ]
    );
    assert_eq!(
        machine.channel().sent(),
        &[
            "cf".to_string(),
            "leds?".to_string(),
            "cf".to_string(),
            "leds?".to_string(),
            "lten1".to_string(),
            "xten1".to_string(),
            "@cob 1".to_string(),
            "l1".to_string(),
            "leds?".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_cobolt4_uncovered_pair_reports_undefined_transition() {
    // 0100 has no entry for the InterlockOpen state: laser LED without the
    // power LED. The run must end with a diagnosis, not a panic.
    let channel = MockChannel::new()
        .always("cf", &["OK\r\n"])
        .on("leds?", &["0\r\n"])
        .on("leds?", &["4\r\n"]);
    let mut machine = StateMachine::with_timings(cobolt::generation4().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::UndefinedTransition {
            state: LaserState::InterlockOpen,
            reading: StatusReading::Token(StatusToken::new("0100")),
        }
    );
    assert_eq!(
        report.history.states(),
        &[LaserState::Unknown, LaserState::InterlockOpen]
    );
}

#[tokio::test]
async fn test_warming_forever_exhausts_step_budget() {
    let model = coherent::sapphire().unwrap().with_step_budget(5);
    let channel = MockChannel::new().always("?STA", &["2\r\n"]);
    let mut machine = StateMachine::with_timings(model, channel, &fast());

    let report = machine.run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Timeout);
    assert_eq!(
        report.history.states(),
        &[LaserState::Unknown, LaserState::WarmingUp]
    );
}

#[tokio::test]
async fn test_failed_status_read_after_follow_up_retries_once() {
    let channel = MockChannel::new()
        .on("?STA", &["1\r\n"])
        .on("?STA", &["garbled\r\n"])
        .on("?STA", &["5\r\n"]);
    let mut machine = StateMachine::with_timings(coherent::sapphire().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert!(report.succeeded());
    let status_polls = machine
        .channel()
        .sent()
        .iter()
        .filter(|cmd| cmd.as_str() == "?STA")
        .count();
    assert_eq!(status_polls, 3);
}

#[tokio::test]
async fn test_second_failed_status_read_surfaces_as_undefined() {
    let channel = MockChannel::new()
        .on("?STA", &["1\r\n"])
        .on("?STA", &["garbled\r\n"])
        .on("?STA", &["garbled\r\n"]);
    let mut machine = StateMachine::with_timings(coherent::sapphire().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::UndefinedTransition {
            state: LaserState::WarmingUp,
            reading: StatusReading::Failed,
        }
    );
}

#[tokio::test]
async fn test_mute_device_diagnosed_not_crashed() {
    let channel = MockChannel::new();
    let mut machine = StateMachine::with_timings(coherent::sapphire().unwrap(), channel, &fast());

    let report = machine.run().await.unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::UndefinedTransition {
            state: LaserState::Unknown,
            reading: StatusReading::Failed,
        }
    );
    assert_eq!(report.history.states(), &[LaserState::Unknown]);
}

#[tokio::test]
async fn test_turn_off_issues_off_sequence() {
    let channel = MockChannel::new().always("l0", &["OK\r\n"]);
    let mut machine = StateMachine::with_timings(cobolt::generation3().unwrap(), channel, &fast());

    machine.turn_off().await.unwrap();

    assert_eq!(machine.channel().sent(), &["l0".to_string()]);
}
