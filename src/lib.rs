pub mod alerts;
pub mod audio;
pub mod console;
pub mod settings;
pub mod timer;
pub mod tips;

use std::{path::PathBuf, sync::Arc};

use alerts::{NotificationCenter, SessionAlerts};
use anyhow::{Context, Result};
use audio::AudioEngineHandle;
use settings::SettingsStore;
use timer::{SessionClock, TokioScheduler};

/// `$TIMEMATE_DATA_DIR`, else `~/.timemate`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TIMEMATE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".timemate"))
        .unwrap_or_else(|_| PathBuf::from(".timemate"))
}

pub async fn run() -> Result<()> {
    // Warn by default so logs stay out of the console; RUST_LOG overrides.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    log::info!("TimeMate starting up...");

    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let settings = Arc::new(SettingsStore::new(data_dir.join("settings.json"))?);
    let center = NotificationCenter::new();
    let audio = AudioEngineHandle::new();

    let alerts = SessionAlerts::new(settings.clone(), center.clone()).with_audio(audio.clone());
    let clock = SessionClock::new(
        settings.clone(),
        Arc::new(alerts),
        Arc::new(TokioScheduler::current()),
    );

    let result = console::run_console(&clock, &settings, &center).await;
    audio.stop();
    result
}
