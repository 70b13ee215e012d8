use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Default for SessionType {
    fn default() -> Self {
        SessionType::Focus
    }
}

/// Icon and accent colour used when rendering a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStyle {
    pub icon: &'static str,
    pub color: &'static str,
}

impl SessionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionType::Focus => "Focus",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    pub fn style(&self) -> SessionStyle {
        match self {
            SessionType::Focus => SessionStyle {
                icon: "🧠",
                color: "accent",
            },
            SessionType::ShortBreak => SessionStyle {
                icon: "☕",
                color: "green",
            },
            SessionType::LongBreak => SessionStyle {
                icon: "🛋",
                color: "teal",
            },
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, SessionType::ShortBreak | SessionType::LongBreak)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ClockState {
    Idle,
    Active,
    Paused,
}

impl Default for ClockState {
    fn default() -> Self {
        ClockState::Idle
    }
}

/// Point-in-time view of the clock pushed to subscribers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClockSnapshot {
    pub state: ClockState,
    pub session_type: SessionType,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub focus_sessions_completed: u32,
    pub progress: f64,
    pub session_started_at: Option<DateTime<Utc>>,
}

/// Result of a single one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown moved; the session is still running.
    Counted,
    /// The countdown reached zero on this tick.
    Expired,
}

/// The session cycle without any scheduling: countdown, session type and
/// focus counter. `SessionClock` drives it and owns the tick source.
#[derive(Debug, Clone)]
pub struct SessionCycle {
    state: ClockState,
    session_type: SessionType,
    remaining_seconds: u64,
    /// Fixed when the session is snapshotted; the progress denominator.
    total_seconds: u64,
    focus_sessions_completed: u32,
    session_started_at: Option<DateTime<Utc>>,
}

impl SessionCycle {
    pub fn new(focus_seconds: u64) -> Self {
        let total = focus_seconds.max(1);
        Self {
            state: ClockState::Idle,
            session_type: SessionType::Focus,
            remaining_seconds: total,
            total_seconds: total,
            focus_sessions_completed: 0,
            session_started_at: None,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn focus_sessions_completed(&self) -> u32 {
        self.focus_sessions_completed
    }

    pub fn progress(&self) -> f64 {
        self.remaining_seconds as f64 / self.total_seconds.max(1) as f64
    }

    /// Starts a fresh countdown of `total_seconds` for the current session type.
    pub fn snapshot_duration(&mut self, total_seconds: u64) {
        let total = total_seconds.max(1);
        self.total_seconds = total;
        self.remaining_seconds = total;
        self.session_started_at = None;
    }

    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.state = ClockState::Active;
        if self.session_started_at.is_none() {
            self.session_started_at = Some(now);
        }
    }

    /// Returns false when the clock was not running.
    pub fn pause(&mut self) -> bool {
        if self.state != ClockState::Active {
            return false;
        }
        self.state = ClockState::Paused;
        true
    }

    pub fn halt(&mut self) {
        self.state = ClockState::Idle;
    }

    pub fn count_down(&mut self) -> TickOutcome {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        if self.remaining_seconds == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Counted
        }
    }

    /// Moves to the session that follows the current one and returns it.
    ///
    /// The interval check uses `>=` so a counter already past a lowered
    /// interval still yields exactly one long break.
    pub fn next_session(&mut self, long_break_interval: u32) -> SessionType {
        let next = match self.session_type {
            SessionType::Focus => {
                self.focus_sessions_completed = self.focus_sessions_completed.saturating_add(1);
                if self.focus_sessions_completed >= long_break_interval.max(1) {
                    self.focus_sessions_completed = 0;
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Focus,
        };
        self.session_type = next;
        next
    }

    pub fn restart(&mut self, focus_seconds: u64) {
        self.state = ClockState::Idle;
        self.focus_sessions_completed = 0;
        self.session_type = SessionType::Focus;
        self.snapshot_duration(focus_seconds);
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            state: self.state,
            session_type: self.session_type,
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds,
            focus_sessions_completed: self.focus_sessions_completed,
            progress: self.progress(),
            session_started_at: self.session_started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cycle_is_idle_focus_with_full_duration() {
        let cycle = SessionCycle::new(1500);
        assert_eq!(cycle.state(), ClockState::Idle);
        assert_eq!(cycle.session_type(), SessionType::Focus);
        assert_eq!(cycle.remaining_seconds(), 1500);
        assert_eq!(cycle.total_seconds(), 1500);
        assert_eq!(cycle.progress(), 1.0);
    }

    #[test]
    fn zero_duration_is_clamped_to_one_second() {
        let mut cycle = SessionCycle::new(0);
        assert_eq!(cycle.total_seconds(), 1);
        cycle.snapshot_duration(0);
        assert_eq!(cycle.remaining_seconds(), 1);
    }

    #[test]
    fn count_down_expires_on_last_second() {
        let mut cycle = SessionCycle::new(3);
        cycle.activate(Utc::now());
        assert_eq!(cycle.count_down(), TickOutcome::Counted);
        assert_eq!(cycle.count_down(), TickOutcome::Counted);
        assert_eq!(cycle.count_down(), TickOutcome::Expired);
        assert_eq!(cycle.remaining_seconds(), 0);
        assert_eq!(cycle.progress(), 0.0);
    }

    #[test]
    fn pause_only_applies_to_active_cycle() {
        let mut cycle = SessionCycle::new(60);
        assert!(!cycle.pause());
        assert_eq!(cycle.state(), ClockState::Idle);

        cycle.activate(Utc::now());
        assert!(cycle.pause());
        assert_eq!(cycle.state(), ClockState::Paused);
        assert!(!cycle.pause());
    }

    #[test]
    fn focus_sessions_lead_to_long_break_after_interval() {
        let mut cycle = SessionCycle::new(60);
        let mut sequence = Vec::new();
        for _ in 0..8 {
            sequence.push(cycle.next_session(4));
        }
        assert_eq!(
            sequence,
            vec![
                SessionType::ShortBreak,
                SessionType::Focus,
                SessionType::ShortBreak,
                SessionType::Focus,
                SessionType::ShortBreak,
                SessionType::Focus,
                SessionType::LongBreak,
                SessionType::Focus,
            ]
        );
        assert_eq!(cycle.focus_sessions_completed(), 0);
    }

    #[test]
    fn lowered_interval_yields_single_long_break() {
        let mut cycle = SessionCycle::new(60);
        for _ in 0..3 {
            cycle.next_session(8);
            cycle.next_session(8);
        }
        assert_eq!(cycle.focus_sessions_completed(), 3);

        assert_eq!(cycle.next_session(2), SessionType::LongBreak);
        assert_eq!(cycle.focus_sessions_completed(), 0);
        assert_eq!(cycle.next_session(2), SessionType::Focus);
        assert_eq!(cycle.next_session(2), SessionType::ShortBreak);
    }

    #[test]
    fn zero_interval_is_treated_as_one() {
        let mut cycle = SessionCycle::new(60);
        assert_eq!(cycle.next_session(0), SessionType::LongBreak);
    }

    #[test]
    fn restart_resets_counter_and_type() {
        let mut cycle = SessionCycle::new(60);
        cycle.next_session(4);
        cycle.activate(Utc::now());
        cycle.restart(1500);

        let snapshot = cycle.snapshot();
        assert_eq!(snapshot.state, ClockState::Idle);
        assert_eq!(snapshot.session_type, SessionType::Focus);
        assert_eq!(snapshot.focus_sessions_completed, 0);
        assert_eq!(snapshot.remaining_seconds, 1500);
        assert!(snapshot.session_started_at.is_none());
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let snapshot = SessionCycle::new(300).snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["sessionType"], "focus");
        assert_eq!(json["state"], "idle");
        assert_eq!(json["remainingSeconds"], 300);
    }

    #[test]
    fn break_types_report_style() {
        assert!(SessionType::ShortBreak.is_break());
        assert!(!SessionType::Focus.is_break());
        assert_eq!(SessionType::LongBreak.style().color, "teal");
        assert_eq!(SessionType::ShortBreak.to_string(), "Short Break");
    }
}
