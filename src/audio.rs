//! Audio system
//!
//! Every effect is synthesized on the fly with Web Audio oscillators and
//! noise buffers; there are no sample files. Off the web (and when audio is
//! unavailable) the sink silently does nothing.

use serde::{Deserialize, Serialize};

/// Sound effect names shared by every game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sound {
    /// Ball or puck struck by a paddle
    PaddleHit,
    /// Wall bounce, brick hit, bullet stopped by an obstacle
    WallHit,
    /// A point was scored
    Score,
    /// A match ended
    GameOver,
    /// UI confirmation
    MenuSelect,
    /// A tank fired
    TankShot,
    /// A tank was destroyed
    Explosion,
}

impl Sound {
    pub const ALL: [Sound; 7] = [
        Sound::PaddleHit,
        Sound::WallHit,
        Sound::Score,
        Sound::GameOver,
        Sound::MenuSelect,
        Sound::TankShot,
        Sound::Explosion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sound::PaddleHit => "paddleHit",
            Sound::WallHit => "wallHit",
            Sound::Score => "score",
            Sound::GameOver => "gameOver",
            Sound::MenuSelect => "menuSelect",
            Sound::TankShot => "tankShot",
            Sound::Explosion => "explosion",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Where sound requests end up
pub trait AudioSink {
    /// Play an effect; a disabled sink ignores the request
    fn play(&mut self, sound: Sound);
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Master volume, clamped to 0.0 - 1.0
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    /// Wake a suspended backend (browsers require a user gesture first)
    fn resume(&mut self) {}
}

/// Sink that accepts everything and plays nothing
#[derive(Debug, Clone)]
pub struct NullAudio {
    enabled: bool,
    volume: f32,
}

impl Default for NullAudio {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 1.0,
        }
    }
}

impl AudioSink for NullAudio {
    fn play(&mut self, sound: Sound) {
        if self.enabled {
            log::trace!("sound: {}", sound.name());
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Sound};

    const C5: f32 = 523.25;
    const E5: f32 = 659.25;
    const G5: f32 = 783.99;
    const G4: f32 = 392.0;

    /// Web Audio synthesizer
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        enabled: bool,
        volume: f32,
        rng: Pcg32,
    }

    impl WebAudio {
        pub fn new(seed: u64) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                enabled: true,
                volume: 1.0,
                rng: Pcg32::seed_from_u64(seed),
            }
        }

        /// Oscillator routed through a gain node to the speakers
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short enveloped tone starting `delay` seconds from now
        fn beep(&self, ctx: &AudioContext, freq: f32, duration: f64, osc_type: OscillatorType, delay: f64) {
            let Some((osc, gain)) = Self::create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(self.volume * 0.3, t + 0.01)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + duration)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration).ok();
        }

        /// Burst of white noise
        fn noise(&mut self, ctx: &AudioContext, duration: f64) {
            let rate = ctx.sample_rate();
            let len = (rate as f64 * duration) as u32;
            let Ok(buffer) = ctx.create_buffer(1, len.max(1), rate) else {
                return;
            };
            let mut samples: Vec<f32> = (0..len)
                .map(|_| self.rng.random_range(-1.0f32..1.0) * 0.1)
                .collect();
            if buffer.copy_to_channel(&mut samples, 0).is_err() {
                return;
            }
            let (Ok(source), Ok(gain)) = (ctx.create_buffer_source(), ctx.create_gain()) else {
                return;
            };
            source.set_buffer(Some(&buffer));
            if source.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(&ctx.destination()).is_err()
            {
                return;
            }
            let t = ctx.current_time();
            gain.gain().set_value_at_time(self.volume * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + duration)
                .ok();
            source.start().ok();
            source.stop_with_when(t + duration).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, sound: Sound) {
            if !self.enabled || self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = self.ctx.clone() else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match sound {
                Sound::PaddleHit => self.beep(&ctx, 800.0, 0.1, OscillatorType::Square, 0.0),
                Sound::WallHit => self.beep(&ctx, 400.0, 0.1, OscillatorType::Sawtooth, 0.0),
                Sound::MenuSelect => self.beep(&ctx, 600.0, 0.05, OscillatorType::Sine, 0.0),
                Sound::Score => {
                    for (i, freq) in [C5, E5, G5].into_iter().enumerate() {
                        self.beep(&ctx, freq, 0.2, OscillatorType::Sine, i as f64 * 0.1);
                    }
                }
                Sound::GameOver => {
                    for (i, freq) in [G5, E5, C5, G4].into_iter().enumerate() {
                        self.beep(&ctx, freq, 0.3, OscillatorType::Sine, i as f64 * 0.2);
                    }
                }
                Sound::TankShot => self.noise(&ctx, 0.1),
                Sound::Explosion => {
                    self.noise(&ctx, 0.5);
                    self.beep(&ctx, 80.0, 0.4, OscillatorType::Sawtooth, 0.0);
                    self.beep(&ctx, 2000.0, 0.1, OscillatorType::Square, 0.05);
                }
            }
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        fn volume(&self) -> f32 {
            self.volume
        }

        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }
    }
}
