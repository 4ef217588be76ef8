/// Sound engine: short sine beeps via rodio.
///
/// Each named sound is a fixed-pitch tone; playback is fire-and-forget
/// (a detached Sink per effect, so overlapping effects mix).
///
/// Compile with `--no-default-features` or without the "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

/// The named effects the game can trigger.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sound {
    Eat,
    GameOver,
    Pause,
    PowerUp,
    LevelUp,
}

impl Sound {
    pub fn name(self) -> &'static str {
        match self {
            Sound::Eat => "eat",
            Sound::GameOver => "gameOver",
            Sound::Pause => "pause",
            Sound::PowerUp => "powerUp",
            Sound::LevelUp => "levelUp",
        }
    }

    /// (frequency Hz, duration s)
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    fn tone(self) -> (f32, f32) {
        match self {
            Sound::Eat => (600.0, 0.10),
            Sound::GameOver => (200.0, 0.50),
            Sound::Pause => (400.0, 0.20),
            Sound::PowerUp => (800.0, 0.15),
            Sound::LevelUp => (1000.0, 0.20),
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::time::Duration;

    use rodio::source::SineWave;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

    use super::Sound;

    const VOLUME: f32 = 0.25;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new() -> Option<Self> {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Some(SoundEngine { _stream: stream, handle }),
                Err(e) => {
                    log::warn!("audio disabled: {e}");
                    None
                }
            }
        }

        pub fn play(&self, sound: Sound) {
            let (freq, secs) = sound.tone();
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    let src = SineWave::new(freq)
                        .take_duration(Duration::from_secs_f32(secs))
                        .fade_in(Duration::from_millis(5))
                        .amplify(VOLUME);
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::debug!("could not play {}: {e}", sound.name()),
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sound: Sound) {}
}
