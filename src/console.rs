//! Terminal front end: renders the menu-bar title and drives the clock from
//! typed commands.

use std::{io::Write, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};

use crate::{
    alerts::NotificationCenter,
    settings::{SettingsStore, TimerSettings},
    timer::{ClockSnapshot, ClockState, SessionClock},
    tips::random_tip,
};

pub const HELP: &str = "\
commands:
  start | s          start or resume the current session
  pause | p          pause the countdown
  stop | x           stop and reset the current session
  skip | n           jump to the next session
  restart | r        back to the first focus session
  status             show the clock and settings
  set <key> <value>  keys: focus, short, long, interval, auto, sound, volume, notify
  reset-settings     restore default settings
  help | ?           this text
  quit | q           exit";

/// `MM:SS`, minutes growing past two digits when needed.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn menu_bar_title(snapshot: &ClockSnapshot) -> String {
    let icon = snapshot.session_type.style().icon;
    let clock = format_clock(snapshot.remaining_seconds);
    match snapshot.state {
        ClockState::Active => format!("{icon} {clock}"),
        ClockState::Paused => format!("{icon} ⏸ {clock}"),
        ClockState::Idle => format!("{icon} {} {clock}", snapshot.session_type),
    }
}

/// ANSI escape for a session colour name.
fn ansi_color(color: &str) -> &'static str {
    match color {
        "green" => "\x1b[32m",
        "teal" => "\x1b[36m",
        _ => "\x1b[35m",
    }
}

/// The menu bar title tinted with the session's accent colour.
pub fn painted_title(snapshot: &ClockSnapshot) -> String {
    let color = ansi_color(snapshot.session_type.style().color);
    format!("{color}{}\x1b[0m", menu_bar_title(snapshot))
}

/// A line worth printing when the clock moves from `previous` to `current`.
pub fn describe_change(previous: &ClockSnapshot, current: &ClockSnapshot) -> Option<String> {
    if previous.session_type != current.session_type {
        let mut line = format!(
            "{} {} ({})",
            current.session_type.style().icon,
            current.session_type,
            format_clock(current.total_seconds)
        );
        if current.session_type.is_break() {
            line.push_str(&format!(" · {}", random_tip()));
        }
        return Some(line);
    }

    if previous.state != current.state {
        let verb = match current.state {
            ClockState::Active if previous.state == ClockState::Paused => "resumed",
            ClockState::Active => "started",
            ClockState::Paused => "paused",
            ClockState::Idle => "stopped",
        };
        return Some(format!("{} {verb}", current.session_type));
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Focus,
    ShortBreak,
    LongBreak,
    Interval,
    AutoStart,
    Sound,
    Volume,
    Notifications,
}

impl FromStr for SettingKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "focus" => SettingKey::Focus,
            "short" | "short-break" => SettingKey::ShortBreak,
            "long" | "long-break" => SettingKey::LongBreak,
            "interval" => SettingKey::Interval,
            "auto" | "auto-start" => SettingKey::AutoStart,
            "sound" => SettingKey::Sound,
            "volume" => SettingKey::Volume,
            "notify" | "notifications" => SettingKey::Notifications,
            other => bail!("unknown setting {other:?}"),
        })
    }
}

impl SettingKey {
    /// Returns `settings` with this key set from `value`. Range checks are
    /// left to `SettingsStore::update_timer`.
    pub fn apply(&self, mut settings: TimerSettings, value: &str) -> Result<TimerSettings> {
        match self {
            SettingKey::Focus => settings.focus_minutes = parse_minutes(value)?,
            SettingKey::ShortBreak => settings.short_break_minutes = parse_minutes(value)?,
            SettingKey::LongBreak => settings.long_break_minutes = parse_minutes(value)?,
            SettingKey::Interval => settings.long_break_interval = parse_minutes(value)?,
            SettingKey::AutoStart => settings.auto_start_next_session = parse_switch(value)?,
            SettingKey::Sound => settings.alarm_sound = value.to_string(),
            SettingKey::Volume => {
                settings.alarm_volume = value
                    .parse()
                    .map_err(|_| anyhow!("volume must be a number between 0 and 1"))?
            }
            SettingKey::Notifications => settings.notifications_enabled = parse_switch(value)?,
        }
        Ok(settings)
    }
}

fn parse_minutes(value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| anyhow!("expected a whole number, got {value:?}"))
}

fn parse_switch(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => bail!("expected on/off, got {value:?}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Pause,
    Stop,
    Skip,
    Restart,
    Status,
    Set(SettingKey, String),
    ResetSettings,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            bail!("empty command");
        };

        Ok(match command.to_ascii_lowercase().as_str() {
            "start" | "s" | "resume" => ConsoleCommand::Start,
            "pause" | "p" => ConsoleCommand::Pause,
            "stop" | "x" => ConsoleCommand::Stop,
            "skip" | "n" => ConsoleCommand::Skip,
            "restart" | "r" => ConsoleCommand::Restart,
            "status" => ConsoleCommand::Status,
            "set" => {
                let key: SettingKey = words
                    .next()
                    .ok_or_else(|| anyhow!("usage: set <key> <value>"))?
                    .parse()?;
                let value: Vec<&str> = words.collect();
                if value.is_empty() {
                    bail!("usage: set <key> <value>");
                }
                ConsoleCommand::Set(key, value.join(" "))
            }
            "reset-settings" => ConsoleCommand::ResetSettings,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "q" | "exit" => ConsoleCommand::Quit,
            other => bail!("unknown command {other:?}; type 'help'"),
        })
    }
}

/// Runs one command and returns anything worth printing.
pub fn execute(
    command: ConsoleCommand,
    clock: &SessionClock,
    settings: &SettingsStore,
) -> Result<Option<String>> {
    match command {
        ConsoleCommand::Start => clock.start(),
        ConsoleCommand::Pause => clock.pause(),
        ConsoleCommand::Stop => clock.stop(),
        ConsoleCommand::Skip => clock.skip(),
        ConsoleCommand::Restart => clock.restart_cycle(),
        ConsoleCommand::Status => return Ok(Some(status_report(&clock.snapshot(), settings))),
        ConsoleCommand::Set(key, value) => {
            let updated = key.apply(settings.timer(), &value)?;
            let stored = settings.update_timer(updated)?;
            return Ok(Some(settings_summary(&stored)));
        }
        ConsoleCommand::ResetSettings => {
            settings.reset_to_defaults()?;
            return Ok(Some(settings_summary(&settings.timer())));
        }
        ConsoleCommand::Help => return Ok(Some(HELP.to_string())),
        ConsoleCommand::Quit => {}
    }
    Ok(None)
}

fn settings_summary(settings: &TimerSettings) -> String {
    format!(
        "focus {}m · short {}m · long {}m · long break every {} · auto-start {} · sound {} ({:.0}%) · notifications {}",
        settings.focus_minutes,
        settings.short_break_minutes,
        settings.long_break_minutes,
        settings.long_break_interval,
        on_off(settings.auto_start_next_session),
        settings.alarm_sound,
        settings.alarm_volume * 100.0,
        on_off(settings.notifications_enabled),
    )
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn status_report(snapshot: &ClockSnapshot, settings: &SettingsStore) -> String {
    let timer = settings.timer();
    format!(
        "{}\n{:?} · {}/{} focus sessions · {:.0}% left\n{}",
        menu_bar_title(snapshot),
        snapshot.state,
        snapshot.focus_sessions_completed,
        timer.long_break_interval,
        snapshot.progress * 100.0,
        settings_summary(&timer)
    )
}

fn redraw(snapshot: &ClockSnapshot) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r\x1b[2K{}", painted_title(snapshot));
    let _ = stdout.flush();
}

fn print_line(line: &str) {
    println!("\r\x1b[2K{line}");
}

pub async fn run_console(
    clock: &SessionClock,
    settings: &SettingsStore,
    center: &NotificationCenter,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state_rx = clock.subscribe();
    let mut notifications = center.subscribe();
    let mut last = clock.snapshot();

    println!("{HELP}\n");
    redraw(&last);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    redraw(&last);
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => match execute(command, clock, settings) {
                        Ok(Some(output)) => print_line(&output),
                        Ok(None) => {}
                        Err(err) => print_line(&format!("error: {err:#}")),
                    },
                    Err(err) => print_line(&err.to_string()),
                }
                redraw(&last);
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = state_rx.borrow_and_update().clone();
                if let Some(line) = describe_change(&last, &current) {
                    print_line(&line);
                }
                redraw(&current);
                last = current;
            }
            received = notifications.recv() => match received {
                Ok(notification) => {
                    print_line(&format!("🔔 {}: {}", notification.title, notification.subtitle));
                    redraw(&last);
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    clock.stop();
    println!();
    Ok(())
}
