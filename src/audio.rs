//! Sound effects
//!
//! The game talks to an [`AudioSink`]. Headless runs use [`SilentAudio`];
//! the browser build uses `WebAudio`, which synthesises every effect with
//! oscillators, so no asset files are needed.

use crate::error::CollaboratorError;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Lane change accepted
    Move,
    Coin,
    Gem,
    PowerUp,
    /// Shield absorbed a hit
    Shield,
    /// Fatal hit
    Collision,
    /// One or more achievements unlocked
    Achievement,
    GameOver,
}

/// Audio output used by the game
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect) -> Result<(), CollaboratorError>;

    fn set_sound_enabled(&mut self, _enabled: bool) {}

    fn set_music_enabled(&mut self, _enabled: bool) {}

    /// Silence everything (cleanup)
    fn stop_all(&mut self) {}
}

/// Audio sink that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _effect: SoundEffect) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Oscillator shape for a tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One synthesised tone: frequency sweep with an exponential gain decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Wave,
    pub start_freq: f32,
    pub end_freq: f32,
    /// Peak gain relative to the sink volume
    pub gain: f32,
    /// Offset from the trigger time (seconds)
    pub delay: f64,
    pub duration: f64,
}

const fn tone(
    wave: Wave,
    start_freq: f32,
    end_freq: f32,
    gain: f32,
    delay: f64,
    duration: f64,
) -> Tone {
    Tone {
        wave,
        start_freq,
        end_freq,
        gain,
        delay,
        duration,
    }
}

const MOVE: &[Tone] = &[tone(Wave::Sine, 300.0, 420.0, 0.2, 0.0, 0.08)];
const COIN: &[Tone] = &[
    tone(Wave::Square, 988.0, 988.0, 0.12, 0.0, 0.06),
    tone(Wave::Square, 1319.0, 1319.0, 0.12, 0.06, 0.12),
];
const GEM: &[Tone] = &[
    tone(Wave::Sine, 1200.0, 1200.0, 0.2, 0.0, 0.25),
    tone(Wave::Sine, 1800.0, 1800.0, 0.2, 0.03, 0.25),
    tone(Wave::Sine, 2400.0, 2400.0, 0.2, 0.06, 0.25),
];
const POWER_UP: &[Tone] = &[tone(Wave::Triangle, 400.0, 1200.0, 0.3, 0.0, 0.3)];
const SHIELD: &[Tone] = &[
    tone(Wave::Square, 400.0, 200.0, 0.25, 0.0, 0.2),
    tone(Wave::Triangle, 250.0, 250.0, 0.2, 0.0, 0.15),
];
const COLLISION: &[Tone] = &[
    tone(Wave::Sawtooth, 100.0, 30.0, 0.5, 0.0, 0.4),
    tone(Wave::Square, 1500.0, 1500.0, 0.2, 0.0, 0.1),
];
// Rising C major arpeggio
const ACHIEVEMENT: &[Tone] = &[
    tone(Wave::Triangle, 523.0, 523.0, 0.25, 0.0, 0.15),
    tone(Wave::Triangle, 659.0, 659.0, 0.25, 0.12, 0.15),
    tone(Wave::Triangle, 784.0, 784.0, 0.25, 0.24, 0.3),
];
const GAME_OVER: &[Tone] = &[tone(Wave::Sawtooth, 300.0, 60.0, 0.35, 0.0, 0.8)];

impl SoundEffect {
    /// Tones that make up the effect
    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundEffect::Move => MOVE,
            SoundEffect::Coin => COIN,
            SoundEffect::Gem => GEM,
            SoundEffect::PowerUp => POWER_UP,
            SoundEffect::Shield => SHIELD,
            SoundEffect::Collision => COLLISION,
            SoundEffect::Achievement => ACHIEVEMENT,
            SoundEffect::GameOver => GAME_OVER,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect, Tone, Wave};
    use crate::error::CollaboratorError;

    /// Web Audio backed sink
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
        sound_enabled: bool,
        music_enabled: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
                sound_enabled: true,
                music_enabled: true,
            }
        }

        pub fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        pub fn music_enabled(&self) -> bool {
            self.music_enabled
        }

        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            wave: Wave,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Triangle => OscillatorType::Triangle,
                Wave::Sawtooth => OscillatorType::Sawtooth,
            });
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(ctx: &AudioContext, tone: &Tone, volume: f32) -> Option<()> {
            let (osc, gain) = Self::create_osc(ctx, tone.start_freq, tone.wave)?;
            let t = ctx.current_time() + tone.delay;

            gain.gain().set_value_at_time(volume * tone.gain, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
                .ok()?;
            if tone.end_freq != tone.start_freq {
                osc.frequency().set_value_at_time(tone.start_freq, t).ok()?;
                osc.frequency()
                    .exponential_ramp_to_value_at_time(tone.end_freq, t + tone.duration)
                    .ok()?;
            }

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(t + tone.duration + 0.05).ok()?;
            Some(())
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect) -> Result<(), CollaboratorError> {
            if !self.sound_enabled || self.volume <= 0.0 {
                return Ok(());
            }
            let Some(ctx) = &self.ctx else {
                return Ok(());
            };

            // Browsers start the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in effect.tones() {
                Self::play_tone(ctx, tone, self.volume)
                    .ok_or_else(|| CollaboratorError::Audio(format!("{effect:?}")))?;
            }
            Ok(())
        }

        fn set_sound_enabled(&mut self, enabled: bool) {
            self.sound_enabled = enabled;
        }

        fn set_music_enabled(&mut self, enabled: bool) {
            self.music_enabled = enabled;
        }

        fn stop_all(&mut self) {
            if let Some(ctx) = self.ctx.take() {
                let _ = ctx.close();
            }
        }
    }
}
