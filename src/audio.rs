//! This module handles sound playback for the game.
//!
//! Sounds are synthesized once at start-up and played in-process. Playback is fire-and-forget:
//! the game loop hands a sound to the active sink and never waits for it to finish.

use std::collections::HashMap;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{debug, trace};

/// Sample rate of every synthesized sound.
pub const SAMPLE_RATE: u32 = 22_050;
const VOLUME: f32 = 0.15;

/// A note: pitch in hertz, where zero is a rest, and length in seconds.
type Note = (f32, f32);

/// The sounds the game can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Sound {
    /// A new level starts.
    Beginning,
    /// A pip was collected.
    Chomp,
    /// The player was caught.
    Death,
    /// An energizer was collected.
    EatFruit,
    /// A pursuer was captured.
    EatGhost,
    /// A level was completed.
    Intermission,
}

impl Sound {
    fn notes(self) -> &'static [Note] {
        match self {
            Sound::Beginning => &[
                (494.0, 0.12),
                (988.0, 0.12),
                (740.0, 0.12),
                (622.0, 0.12),
                (988.0, 0.06),
                (740.0, 0.18),
                (622.0, 0.24),
                (0.0, 0.06),
                (523.0, 0.12),
                (1047.0, 0.12),
                (784.0, 0.12),
                (659.0, 0.12),
                (1047.0, 0.06),
                (784.0, 0.18),
                (659.0, 0.24),
            ],
            Sound::Chomp => &[(330.0, 0.05), (220.0, 0.05)],
            Sound::Death => &[
                (988.0, 0.1),
                (932.0, 0.1),
                (880.0, 0.1),
                (831.0, 0.1),
                (784.0, 0.1),
                (740.0, 0.1),
                (698.0, 0.1),
                (659.0, 0.15),
                (0.0, 0.1),
                (247.0, 0.08),
                (247.0, 0.08),
            ],
            Sound::EatFruit => &[(523.0, 0.06), (659.0, 0.06), (784.0, 0.06), (1047.0, 0.1)],
            Sound::EatGhost => &[(1568.0, 0.04), (1175.0, 0.04), (784.0, 0.04), (1175.0, 0.04), (1568.0, 0.08)],
            Sound::Intermission => &[(392.0, 0.15), (523.0, 0.15), (659.0, 0.15), (784.0, 0.3), (659.0, 0.15), (784.0, 0.45)],
        }
    }

    /// Renders the sound as mono samples at [`SAMPLE_RATE`].
    pub fn samples(self) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(pitch, length) in self.notes() {
            let count = (length * SAMPLE_RATE as f32) as usize;
            samples.extend((0..count).map(|i| {
                if pitch <= 0.0 {
                    return 0.0;
                }
                let t = i as f32 / SAMPLE_RATE as f32;
                let wave = if (t * pitch).fract() < 0.5 { 1.0 } else { -1.0 };
                // Fading each note out keeps consecutive notes from clicking
                let fade = 1.0 - i as f32 / count as f32;
                wave * fade * VOLUME
            }));
        }
        samples
    }
}

/// Every sound, rendered.
pub fn sample_bank() -> HashMap<Sound, Vec<f32>> {
    Sound::iter().map(|sound| (sound, sound.samples())).collect()
}

/// A destination for sounds.
pub trait AudioSink {
    fn play(&self, sound: Sound);

    /// Stops anything still playing. Sinks that cannot stop playback ignore this.
    fn stop(&self) {}
}

/// Plays sounds on the default output device.
#[cfg(feature = "sound")]
pub struct Speaker {
    // Output stops once the stream is dropped
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
    bank: HashMap<Sound, Vec<f32>>,
    playing: parking_lot::Mutex<Vec<rodio::Sink>>,
}

#[cfg(feature = "sound")]
impl Speaker {
    pub fn try_default() -> Result<Self, rodio::StreamError> {
        let (stream, handle) = rodio::OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            bank: sample_bank(),
            playing: parking_lot::Mutex::new(Vec::new()),
        })
    }
}

#[cfg(feature = "sound")]
impl AudioSink for Speaker {
    fn play(&self, sound: Sound) {
        let Some(samples) = self.bank.get(&sound) else {
            return;
        };

        match rodio::Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(rodio::buffer::SamplesBuffer::new(1, SAMPLE_RATE, samples.clone()));
                // Sinks are held rather than detached so that `stop` can cut them short
                let mut playing = self.playing.lock();
                playing.retain(|other| !other.empty());
                playing.push(sink);
            }
            Err(e) => tracing::warn!(?sound, error = %e, "Could not open an audio sink"),
        }
    }

    fn stop(&self) {
        for sink in self.playing.lock().drain(..) {
            sink.stop();
        }
    }
}

/// Discards every sound.
#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&self, _sound: Sound) {}
}

/// The audio system for the game.
///
/// Wraps the active sink and the mute switch.
pub struct Audio {
    sink: Box<dyn AudioSink>,
    muted: bool,
    disabled: bool,
}

impl Audio {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            muted: false,
            disabled: false,
        }
    }

    /// Audio that never plays anything.
    pub fn disabled() -> Self {
        Self {
            sink: Box::new(Silent),
            muted: false,
            disabled: true,
        }
    }

    /// Opens the default output device, or disables audio when there is none.
    #[cfg(feature = "sound")]
    pub fn open() -> Self {
        match Speaker::try_default() {
            Ok(speaker) => {
                debug!("Audio output opened");
                Self::new(Box::new(speaker))
            }
            Err(e) => {
                tracing::warn!(error = %e, "No audio output, sounds are disabled");
                Self::disabled()
            }
        }
    }

    /// Built without sound support, so audio is always disabled.
    #[cfg(not(feature = "sound"))]
    pub fn open() -> Self {
        debug!("Built without sound support");
        Self::disabled()
    }

    /// Plays a sound without waiting for it. A no-op while muted or disabled.
    pub fn play(&self, sound: Sound) {
        if self.muted || self.disabled {
            trace!(?sound, muted = self.muted, disabled = self.disabled, "Skipping sound");
            return;
        }

        trace!(?sound, "Playing sound");
        self.sink.play(sound);
    }

    /// Stops whatever the sink is still playing.
    pub fn stop(&self) {
        self.sink.stop();
    }

    /// Instantly mute or unmute.
    pub fn set_mute(&mut self, mute: bool) {
        if mute != self.muted {
            debug!(muted = mute, "Audio mute state changed");
        }
        self.muted = mute;
        if mute {
            self.stop();
        }
    }

    /// Returns `true` if the audio is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicUsize>);

    impl AudioSink for Counting {
        fn play(&self, _sound: Sound) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_every_sound_is_rendered() {
        let bank = sample_bank();
        assert_eq!(bank.len(), Sound::iter().count());
        for (sound, samples) in &bank {
            assert!(!samples.is_empty(), "{sound} is empty");
            assert!(samples.iter().all(|s| s.abs() <= VOLUME), "{sound} clips");
        }
        assert!(bank[&Sound::Chomp].len() < bank[&Sound::Beginning].len());
    }

    #[test]
    fn test_rests_are_silent() {
        let samples = Sound::Death.samples();
        // The rest follows eight notes lasting 0.85s in total
        let rest_start = (0.85 * SAMPLE_RATE as f32) as usize + 10;
        assert!(samples[rest_start..rest_start + 100].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_mute_is_a_no_op() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut audio = Audio::new(Box::new(Counting(count.clone())));

        audio.play(Sound::Chomp);
        audio.set_mute(true);
        audio.play(Sound::Chomp);
        audio.set_mute(false);
        audio.play(Sound::Death);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disabled_audio() {
        let audio = Audio::disabled();
        assert!(audio.is_disabled());
        audio.play(Sound::Beginning);
    }
}
