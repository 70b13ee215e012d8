use super::SessionType;

/// Read-only view of the timer configuration. Values are read when a session
/// is snapshotted, never polled during a countdown.
pub trait ConfigProvider: Send + Sync {
    fn duration_minutes(&self, session: SessionType) -> u32;

    fn long_break_interval(&self) -> u32;

    fn auto_start_next_session(&self) -> bool;

    /// Debug builds of the settings read minutes as seconds.
    fn seconds_per_minute(&self) -> u64 {
        60
    }

    fn duration_seconds(&self, session: SessionType) -> u64 {
        (u64::from(self.duration_minutes(session)) * self.seconds_per_minute()).max(1)
    }
}

/// Receives organic session completions. Must not block and must not call
/// back into the clock.
pub trait Notifier: Send + Sync {
    fn on_session_complete(&self, session: SessionType);
}

/// Notifier used when nothing should be surfaced.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn on_session_complete(&self, _session: SessionType) {}
}
