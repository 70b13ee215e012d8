pub mod chime;

pub use chime::{AlarmSound, Chime};

use anyhow::{anyhow, Result};
use log::{debug, warn};
use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex, PoisonError,
};
use std::thread;

enum AudioCommand {
    PlayChime { sound: AlarmSound, volume: f32 },
    Stop,
}

/// Handle to the alarm audio thread. rodio output objects are not `Send`, so
/// they live on a dedicated thread fed by a command channel.
#[derive(Clone, Default)]
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>> {
        let mut guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("alarm-audio".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<()> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| anyhow!("Failed to create audio output stream: {e}"))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| anyhow!("Failed to create audio sink: {e}"))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::PlayChime { sound, volume } => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                debug!("Skipping {} alarm: {err}", sound.name());
                                continue;
                            }
                            if let Some(ref s) = sink {
                                // A newer alarm replaces one still ringing.
                                s.clear();
                                s.append(sound.chime(volume));
                                s.play();
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                    }
                }
            })
            .map_err(|e| anyhow!("Failed to spawn audio thread: {e}"))?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    /// Plays the named alarm. Unknown names are skipped silently.
    pub fn play_alarm(&self, sound_name: &str, volume: f32) -> Result<()> {
        let Some(sound) = AlarmSound::from_name(sound_name) else {
            debug!("No alarm sound named {sound_name:?}; skipping");
            return Ok(());
        };

        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::PlayChime { sound, volume })
            .map_err(|e| anyhow!("Audio thread is gone: {e}"))
    }

    pub fn stop(&self) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(tx) = tx {
            if tx.send(AudioCommand::Stop).is_err() {
                warn!("Audio thread exited before stop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sound_does_not_start_audio_thread() {
        let engine = AudioEngineHandle::new();
        engine.play_alarm("Kazoo", 1.0).unwrap();
        assert!(engine.tx.lock().unwrap().is_none());
    }

    #[test]
    fn stop_without_thread_is_harmless() {
        AudioEngineHandle::new().stop();
    }
}
