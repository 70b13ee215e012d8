use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use crate::timer::{ConfigProvider, SessionType};

pub const FOCUS_MINUTES: RangeInclusive<u32> = 5..=60;
pub const SHORT_BREAK_MINUTES: RangeInclusive<u32> = 1..=15;
pub const LONG_BREAK_MINUTES: RangeInclusive<u32> = 10..=30;
pub const LONG_BREAK_INTERVAL: RangeInclusive<u32> = 2..=8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub long_break_interval: u32,
    pub auto_start_next_session: bool,
    pub alarm_sound: String,
    pub alarm_volume: f32,
    pub notifications_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            long_break_interval: 4,
            auto_start_next_session: true,
            alarm_sound: "Glass".into(),
            alarm_volume: 1.0,
            notifications_enabled: true,
        }
    }
}

impl TimerSettings {
    /// Snaps every value into the range the settings screen offers.
    pub fn clamped(mut self) -> Self {
        self.focus_minutes = snap(self.focus_minutes, FOCUS_MINUTES, 5);
        self.short_break_minutes = snap(self.short_break_minutes, SHORT_BREAK_MINUTES, 1);
        self.long_break_minutes = snap(self.long_break_minutes, LONG_BREAK_MINUTES, 5);
        self.long_break_interval = snap(self.long_break_interval, LONG_BREAK_INTERVAL, 1);
        self.alarm_volume = if self.alarm_volume.is_finite() {
            self.alarm_volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    pub fn minutes_for(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Focus => self.focus_minutes,
            SessionType::ShortBreak => self.short_break_minutes,
            SessionType::LongBreak => self.long_break_minutes,
        }
    }
}

fn snap(value: u32, range: RangeInclusive<u32>, step: u32) -> u32 {
    let (min, max) = (*range.start(), *range.end());
    let clamped = value.clamp(min, max);
    let offset = clamped - min;
    let down = min + offset / step * step;
    if offset % step * 2 >= step && down + step <= max {
        down + step
    } else {
        down
    }
}

impl ConfigProvider for TimerSettings {
    fn duration_minutes(&self, session: SessionType) -> u32 {
        self.minutes_for(session)
    }

    fn long_break_interval(&self) -> u32 {
        self.long_break_interval
    }

    fn auto_start_next_session(&self) -> bool {
        self.auto_start_next_session
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    timer: TimerSettings,
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<UserSettings>,
    debug_durations: bool,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            Self::read(&path).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings: {err:#}");
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        let debug_durations = std::env::var("TIMEMATE_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_durations {
            warn!("TIMEMATE_DEBUG is set: session minutes run as seconds");
        }

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
            debug_durations,
        })
    }

    /// A store that never touches the disk.
    pub fn in_memory(settings: TimerSettings) -> Self {
        Self {
            path: None,
            data: RwLock::new(UserSettings { timer: settings }),
            debug_durations: false,
        }
    }

    pub fn with_debug_durations(mut self, enabled: bool) -> Self {
        self.debug_durations = enabled;
        self
    }

    pub fn timer(&self) -> TimerSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .timer
            .clone()
    }

    /// Stores `settings` clamped to the supported ranges and returns what was
    /// stored. Nothing changes in memory unless the write succeeds.
    pub fn update_timer(&self, settings: TimerSettings) -> Result<TimerSettings> {
        let settings = settings.clamped();
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let updated = UserSettings {
            timer: settings.clone(),
        };
        self.persist(&updated)?;
        *guard = updated;
        Ok(settings)
    }

    pub fn reset_to_defaults(&self) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let defaults = UserSettings::default();
        self.persist(&defaults)?;
        *guard = defaults;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = Self::read(path)?;
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = data;
        Ok(())
    }

    fn read(path: &Path) -> Result<UserSettings> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

impl ConfigProvider for SettingsStore {
    fn duration_minutes(&self, session: SessionType) -> u32 {
        self.timer().minutes_for(session)
    }

    fn long_break_interval(&self) -> u32 {
        self.timer().long_break_interval
    }

    fn auto_start_next_session(&self) -> bool {
        self.timer().auto_start_next_session
    }

    fn seconds_per_minute(&self) -> u64 {
        if self.debug_durations {
            1
        } else {
            60
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let settings = TimerSettings::default();
        assert_eq!(settings.focus_minutes, 25);
        assert_eq!(settings.short_break_minutes, 5);
        assert_eq!(settings.long_break_minutes, 15);
        assert_eq!(settings.long_break_interval, 4);
        assert!(settings.auto_start_next_session);
        assert_eq!(settings.alarm_sound, "Glass");
    }

    #[test]
    fn clamped_snaps_to_steps_and_bounds() {
        let settings = TimerSettings {
            focus_minutes: 27,
            short_break_minutes: 0,
            long_break_minutes: 99,
            long_break_interval: 1,
            alarm_volume: 3.0,
            ..TimerSettings::default()
        }
        .clamped();

        assert_eq!(settings.focus_minutes, 25);
        assert_eq!(settings.short_break_minutes, 1);
        assert_eq!(settings.long_break_minutes, 30);
        assert_eq!(settings.long_break_interval, 2);
        assert_eq!(settings.alarm_volume, 1.0);

        assert_eq!(snap(28, FOCUS_MINUTES, 5), 30);
        assert_eq!(snap(58, FOCUS_MINUTES, 5), 60);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.timer(), TimerSettings::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.timer(), TimerSettings::default());
    }

    #[test]
    fn non_utf8_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.timer(), TimerSettings::default());
    }

    #[test]
    fn directory_in_place_of_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::create_dir(&path).unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.timer(), TimerSettings::default());
    }

    #[test]
    fn failed_write_leaves_settings_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("missing").join("settings.json")).unwrap();

        let result = store.update_timer(TimerSettings {
            focus_minutes: 50,
            ..TimerSettings::default()
        });
        assert!(result.is_err());
        assert_eq!(store.timer().focus_minutes, 25);
        assert_eq!(store.duration_seconds(SessionType::Focus), 25 * 60);
    }

    #[test]
    fn failed_reset_keeps_current_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_timer(TimerSettings {
                focus_minutes: 40,
                ..TimerSettings::default()
            })
            .unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(store.reset_to_defaults().is_err());
        assert_eq!(store.timer().focus_minutes, 40);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "timer": { "focus_minutes": 45 } }"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let settings = store.timer();
        assert_eq!(settings.focus_minutes, 45);
        assert_eq!(settings.short_break_minutes, 5);
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        let stored = store
            .update_timer(TimerSettings {
                focus_minutes: 50,
                auto_start_next_session: false,
                ..TimerSettings::default()
            })
            .unwrap();
        assert_eq!(stored.focus_minutes, 50);

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.timer().focus_minutes, 50);
        assert!(!reopened.timer().auto_start_next_session);

        reopened.reset_to_defaults().unwrap();
        store.reload().unwrap();
        assert_eq!(store.timer(), TimerSettings::default());
    }

    #[test]
    fn plain_settings_act_as_config() {
        let settings = TimerSettings {
            long_break_interval: 3,
            ..TimerSettings::default()
        };
        assert_eq!(settings.duration_seconds(SessionType::ShortBreak), 300);
        assert_eq!(settings.long_break_interval(), 3);
        assert!(settings.auto_start_next_session());
    }

    #[test]
    fn store_provides_durations_in_seconds() {
        let store = SettingsStore::in_memory(TimerSettings::default());
        assert_eq!(store.duration_seconds(SessionType::Focus), 25 * 60);
        assert_eq!(store.duration_seconds(SessionType::LongBreak), 15 * 60);

        let debug = store.with_debug_durations(true);
        assert_eq!(debug.duration_seconds(SessionType::ShortBreak), 5);
    }
}
