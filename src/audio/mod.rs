//! Audio system
//!
//! Procedurally generated sound effects - no external files needed!

pub mod cache;
pub mod sink;
pub mod tone;
pub mod wav;

pub use cache::ToneCache;
pub use sink::{AudioSink, MemorySink, NullSink};
pub use tone::{Envelope, SampleBuffer, ToneSpec, Waveform, synthesize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Ball bounces off a wall
    WallBounce,
    /// Ball hits a paddle
    PaddleHit,
    /// Brick destroyed
    BrickBreak,
    /// Ball went past the paddle
    BallLost,
    /// Ball served/launched
    Launch,
    /// Point scored (Pong)
    Score,
    /// Snake ate food
    Eat,
    /// Level or match won
    Win,
    /// Game over
    GameOver,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 9] = [
        SoundEffect::WallBounce,
        SoundEffect::PaddleHit,
        SoundEffect::BrickBreak,
        SoundEffect::BallLost,
        SoundEffect::Launch,
        SoundEffect::Score,
        SoundEffect::Eat,
        SoundEffect::Win,
        SoundEffect::GameOver,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::WallBounce => "wall_bounce",
            SoundEffect::PaddleHit => "paddle_hit",
            SoundEffect::BrickBreak => "brick_break",
            SoundEffect::BallLost => "ball_lost",
            SoundEffect::Launch => "launch",
            SoundEffect::Score => "score",
            SoundEffect::Eat => "eat",
            SoundEffect::Win => "win",
            SoundEffect::GameOver => "game_over",
        }
    }

    /// Tone for this effect at full volume
    pub fn tone(&self, sample_rate: u32) -> ToneSpec {
        let click = |decay: f32| Envelope::AttackDecay {
            attack: 0.005,
            decay,
        };
        match self {
            // Short square blip
            SoundEffect::WallBounce => {
                ToneSpec::new(Waveform::Square, 350.0, 0.05, 0.5, sample_rate)
                    .with_envelope(click(0.05))
            }
            // Soft sine thump
            SoundEffect::PaddleHit => {
                ToneSpec::new(Waveform::Sine, 220.0, 0.07, 0.7, sample_rate)
                    .with_envelope(click(0.07))
            }
            // Noise crunch
            SoundEffect::BrickBreak => {
                ToneSpec::new(Waveform::Noise, 100.0, 0.15, 0.5, sample_rate)
                    .with_envelope(click(0.1))
            }
            SoundEffect::BallLost => {
                ToneSpec::new(Waveform::Square, 150.0, 0.2, 0.5, sample_rate)
                    .with_envelope(click(0.18))
            }
            SoundEffect::Launch => ToneSpec::new(Waveform::Square, 220.0, 0.06, 0.5, sample_rate),
            SoundEffect::Score => ToneSpec::new(Waveform::Square, 660.0, 0.1, 0.5, sample_rate)
                .with_envelope(click(0.1)),
            SoundEffect::Eat => ToneSpec::new(Waveform::Sine, 880.0, 0.08, 0.6, sample_rate)
                .with_envelope(click(0.08)),
            // Bright sawtooth fanfare
            SoundEffect::Win => ToneSpec::new(Waveform::Sawtooth, 880.0, 0.3, 0.5, sample_rate)
                .with_envelope(Envelope::AttackDecay {
                    attack: 0.01,
                    decay: 0.25,
                }),
            // Low sawtooth drone
            SoundEffect::GameOver => {
                ToneSpec::new(Waveform::Sawtooth, 110.0, 0.5, 0.5, sample_rate)
                    .with_envelope(click(0.4))
            }
        }
    }
}

/// Audio manager for the game
#[derive(Debug)]
pub struct AudioManager {
    cache: ToneCache,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            cache: ToneCache::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        let vol = vol.clamp(0.0, 1.0);
        if vol != self.master_volume {
            self.master_volume = vol;
            self.drop_stale_tones();
        }
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        let vol = vol.clamp(0.0, 1.0);
        if vol != self.sfx_volume {
            self.sfx_volume = vol;
            self.drop_stale_tones();
        }
    }

    /// Cached tones bake in the old volume and can never be hit again
    fn drop_stale_tones(&mut self) {
        if !self.cache.is_empty() {
            log::debug!("Volume changed, dropping {} cached tones", self.cache.len());
            self.cache.clear();
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn cache(&self) -> &ToneCache {
        &self.cache
    }

    /// Tone actually played for `effect` on a sink with the given sample rate
    pub fn tone_for(&self, effect: SoundEffect, sample_rate: u32) -> ToneSpec {
        let spec = effect.tone(sample_rate);
        spec.with_volume((spec.volume * self.effective_volume()).clamp(0.0, 1.0))
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect, sink: &mut dyn AudioSink) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        // Format comes from the sink, never assumed
        let spec = self.tone_for(effect, sink.sample_rate());
        match self.cache.get_or_synthesize(&spec, sink.channels()) {
            Ok(buf) => sink.play_one_shot(buf),
            Err(e) => log::warn!("Failed to synthesize {}: {}", effect.name(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_effect_synthesizes() {
        for effect in SoundEffect::ALL {
            for rate in [22050, 44100] {
                let buf = synthesize(&effect.tone(rate));
                assert!(buf.is_ok(), "{} at {rate}", effect.name());
            }
        }
    }

    #[test]
    fn test_play_uses_sink_format() {
        let mut audio = AudioManager::new();
        let mut sink = MemorySink::new(2, 44100);
        audio.play(SoundEffect::PaddleHit, &mut sink);

        assert_eq!(sink.played().len(), 1);
        let buf = &sink.played()[0];
        assert_eq!(buf.channels(), 2);
        assert_eq!(buf.sample_rate(), 44100);
        assert_eq!(buf.frames(), (44100.0_f64 * 0.07).round() as usize);
    }

    #[test]
    fn test_repeat_plays_hit_cache() {
        let mut audio = AudioManager::new();
        let mut sink = MemorySink::new(1, 22050);
        for _ in 0..5 {
            audio.play(SoundEffect::WallBounce, &mut sink);
        }
        assert_eq!(sink.played().len(), 5);
        assert_eq!(audio.cache().misses(), 1);
        assert_eq!(audio.cache().hits(), 4);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut audio = AudioManager::new();
        audio.set_muted(true);
        let mut sink = MemorySink::new(2, 22050);
        audio.play(SoundEffect::Win, &mut sink);
        assert!(sink.played().is_empty());
        assert!(audio.cache().is_empty());
    }

    #[test]
    fn test_volume_change_does_not_grow_cache() {
        let mut audio = AudioManager::new();
        let mut sink = MemorySink::new(2, 22050);
        for step in 1..=20 {
            audio.set_master_volume(step as f32 / 20.0);
            for effect in SoundEffect::ALL {
                audio.play(effect, &mut sink);
            }
        }
        assert_eq!(audio.cache().len(), SoundEffect::ALL.len());

        // Setting the same volume keeps what is cached
        audio.set_master_volume(1.0);
        assert_eq!(audio.cache().len(), SoundEffect::ALL.len());
    }

    #[test]
    fn test_volume_scales_peak() {
        let mut audio = AudioManager::new();
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0); // clamped to 1.0
        let spec = audio.tone_for(SoundEffect::Launch, 22050);
        assert!((spec.volume - 0.25).abs() < 1e-6);

        let mut sink = MemorySink::new(1, 22050);
        audio.play(SoundEffect::Launch, &mut sink);
        let bound = (0.25 * tone::MAX_AMPLITUDE) as u16;
        assert!(sink.played()[0].peak() <= bound);
    }
}
