use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;

/// Named alarm sounds, after the classic desktop system sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSound {
    Basso,
    Blow,
    Bottle,
    Frog,
    Funk,
    Glass,
    Hero,
    Morse,
    Ping,
    Pop,
    Purr,
    Sosumi,
    Submarine,
    Tink,
}

impl AlarmSound {
    pub const ALL: [AlarmSound; 14] = [
        AlarmSound::Basso,
        AlarmSound::Blow,
        AlarmSound::Bottle,
        AlarmSound::Frog,
        AlarmSound::Funk,
        AlarmSound::Glass,
        AlarmSound::Hero,
        AlarmSound::Morse,
        AlarmSound::Ping,
        AlarmSound::Pop,
        AlarmSound::Purr,
        AlarmSound::Sosumi,
        AlarmSound::Submarine,
        AlarmSound::Tink,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sound| sound.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlarmSound::Basso => "Basso",
            AlarmSound::Blow => "Blow",
            AlarmSound::Bottle => "Bottle",
            AlarmSound::Frog => "Frog",
            AlarmSound::Funk => "Funk",
            AlarmSound::Glass => "Glass",
            AlarmSound::Hero => "Hero",
            AlarmSound::Morse => "Morse",
            AlarmSound::Ping => "Ping",
            AlarmSound::Pop => "Pop",
            AlarmSound::Purr => "Purr",
            AlarmSound::Sosumi => "Sosumi",
            AlarmSound::Submarine => "Submarine",
            AlarmSound::Tink => "Tink",
        }
    }

    /// (tone Hz, note length ms, notes)
    fn voice(&self) -> (f32, u64, u32) {
        match self {
            AlarmSound::Basso => (110.0, 500, 1),
            AlarmSound::Blow => (330.0, 450, 1),
            AlarmSound::Bottle => (660.0, 250, 1),
            AlarmSound::Frog => (220.0, 120, 3),
            AlarmSound::Funk => (180.0, 300, 2),
            AlarmSound::Glass => (1760.0, 600, 1),
            AlarmSound::Hero => (523.3, 220, 3),
            AlarmSound::Morse => (880.0, 90, 4),
            AlarmSound::Ping => (1320.0, 400, 1),
            AlarmSound::Pop => (440.0, 80, 1),
            AlarmSound::Purr => (150.0, 350, 2),
            AlarmSound::Sosumi => (740.0, 180, 2),
            AlarmSound::Submarine => (247.0, 700, 1),
            AlarmSound::Tink => (2093.0, 120, 1),
        }
    }

    pub fn chime(&self, volume: f32) -> Chime {
        let (frequency, note_ms, notes) = self.voice();
        Chime::new(frequency, Duration::from_millis(note_ms), notes, volume)
    }
}

/// Sine tone notes with an exponential decay, separated by short rests.
pub struct Chime {
    frequency: f32,
    note_samples: usize,
    rest_samples: usize,
    notes: u32,
    amplitude: f32,
    num_sample: usize,
}

impl Chime {
    pub fn new(frequency: f32, note: Duration, notes: u32, volume: f32) -> Self {
        let note_samples = (note.as_secs_f32() * SAMPLE_RATE as f32) as usize;
        Self {
            frequency,
            note_samples: note_samples.max(1),
            rest_samples: SAMPLE_RATE as usize / 20,
            notes: notes.max(1),
            amplitude: 0.4 * volume.clamp(0.0, 1.0),
            num_sample: 0,
        }
    }

    fn total_samples(&self) -> usize {
        let period = self.note_samples + self.rest_samples;
        period * self.notes as usize - self.rest_samples
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples() {
            return None;
        }

        let period = self.note_samples + self.rest_samples;
        let position = self.num_sample % period;
        self.num_sample += 1;

        if position >= self.note_samples {
            return Some(0.0);
        }

        let t = position as f32 / SAMPLE_RATE as f32;
        let envelope = (-5.0 * position as f32 / self.note_samples as f32).exp();
        Some((2.0 * PI * self.frequency * t).sin() * envelope * self.amplitude)
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples().saturating_sub(self.num_sample))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(
            self.total_samples() as f32 / SAMPLE_RATE as f32,
        ))
    }
}
