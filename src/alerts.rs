//! Session-complete alerts: an alarm sound plus a notification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    audio::AudioEngineHandle,
    settings::SettingsStore,
    timer::{Notifier, SessionType},
};

const APP_TITLE: &str = "TimeMate";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNotification {
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub session_type: SessionType,
    pub delivered_at: DateTime<Utc>,
}

impl SessionNotification {
    pub fn session_complete(session: SessionType) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: APP_TITLE.to_string(),
            subtitle: format!("{} session complete!", session.display_name()),
            session_type: session,
            delivered_at: Utc::now(),
        }
    }
}

/// Fans notifications out to whoever renders them.
#[derive(Clone)]
pub struct NotificationCenter {
    tx: broadcast::Sender<SessionNotification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotification> {
        self.tx.subscribe()
    }

    pub fn post(&self, notification: SessionNotification) {
        info!(
            "Notification {}: {} - {}",
            notification.id, notification.title, notification.subtitle
        );
        // Nobody listening is fine.
        let _ = self.tx.send(notification);
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

/// `Notifier` that plays the configured alarm and posts a notification.
/// Settings are read when the alert fires.
pub struct SessionAlerts {
    settings: Arc<SettingsStore>,
    center: NotificationCenter,
    audio: Option<AudioEngineHandle>,
}

impl SessionAlerts {
    pub fn new(settings: Arc<SettingsStore>, center: NotificationCenter) -> Self {
        Self {
            settings,
            center,
            audio: None,
        }
    }

    pub fn with_audio(mut self, audio: AudioEngineHandle) -> Self {
        self.audio = Some(audio);
        self
    }
}

impl Notifier for SessionAlerts {
    fn on_session_complete(&self, session: SessionType) {
        let settings = self.settings.timer();

        if let Some(audio) = &self.audio {
            if let Err(err) = audio.play_alarm(&settings.alarm_sound, settings.alarm_volume) {
                warn!("Failed to play {} alarm: {err}", settings.alarm_sound);
            }
        }

        if settings.notifications_enabled {
            self.center
                .post(SessionNotification::session_complete(session));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TimerSettings;

    #[test]
    fn notification_names_completed_session() {
        let notification = SessionNotification::session_complete(SessionType::ShortBreak);
        assert_eq!(notification.title, "TimeMate");
        assert_eq!(notification.subtitle, "Short Break session complete!");
    }

    #[test]
    fn alerts_post_when_notifications_enabled() {
        let settings = Arc::new(SettingsStore::in_memory(TimerSettings::default()));
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        SessionAlerts::new(settings, center).on_session_complete(SessionType::Focus);

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.session_type, SessionType::Focus);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn alerts_stay_quiet_when_notifications_disabled() {
        let settings = Arc::new(SettingsStore::in_memory(TimerSettings {
            notifications_enabled: false,
            ..TimerSettings::default()
        }));
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        SessionAlerts::new(settings, center).on_session_complete(SessionType::LongBreak);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn posting_without_subscribers_is_harmless() {
        NotificationCenter::new().post(SessionNotification::session_complete(SessionType::Focus));
    }
}
