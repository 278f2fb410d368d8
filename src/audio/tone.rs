//! Tone synthesis
//!
//! Turns a handful of parameters into a 16-bit PCM buffer. Nothing is loaded
//! from disk; every "beep" and "boop" is computed on the spot.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{ArcadeError, Result};

/// Peak value of a signed 16-bit sample
pub const MAX_AMPLITUDE: f64 = i16::MAX as f64;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    /// Pulse wave, high for `duty` of each period
    Square,
    Triangle,
    Sawtooth,
    /// Uniform white noise (seeded from the tone parameters)
    Noise,
}

/// Amplitude envelope applied on top of the raw waveform
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Envelope {
    /// Constant gain of 1.0
    #[default]
    Flat,
    /// Linear ramp up over `attack` seconds, then linear fade to silence over
    /// `decay` seconds
    AttackDecay { attack: f32, decay: f32 },
}

impl Envelope {
    /// Gain at time `t` (seconds), always within [0, 1]
    pub fn gain(&self, t: f64) -> f64 {
        match *self {
            Envelope::Flat => 1.0,
            Envelope::AttackDecay { attack, decay } => {
                let attack = attack as f64;
                let decay = decay as f64;
                if t < attack {
                    t / attack
                } else {
                    (1.0 - (t - attack) / decay).clamp(0.0, 1.0)
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if let Envelope::AttackDecay { attack, decay } = *self {
            if !attack.is_finite() || attack < 0.0 {
                return Err(invalid("attack", attack as f64));
            }
            if !decay.is_finite() || decay <= 0.0 {
                return Err(invalid("decay", decay as f64));
            }
        }
        Ok(())
    }
}

/// Everything needed to synthesize one sound effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub waveform: Waveform,
    /// Hz
    pub frequency: f32,
    /// Seconds
    pub duration: f32,
    /// 0.0 - 1.0
    pub volume: f32,
    /// Samples per second
    pub sample_rate: u32,
    /// Fraction of each period a square wave spends high
    #[serde(default = "default_duty")]
    pub duty: f32,
    #[serde(default)]
    pub envelope: Envelope,
}

fn default_duty() -> f32 {
    0.5
}

fn invalid(field: &'static str, value: f64) -> ArcadeError {
    ArcadeError::InvalidTone { field, value }
}

impl ToneSpec {
    pub fn new(
        waveform: Waveform,
        frequency: f32,
        duration: f32,
        volume: f32,
        sample_rate: u32,
    ) -> Self {
        Self {
            waveform,
            frequency,
            duration,
            volume,
            sample_rate,
            duty: default_duty(),
            envelope: Envelope::Flat,
        }
    }

    pub fn with_duty(mut self, duty: f32) -> Self {
        self.duty = duty;
        self
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Number of sample slots this tone occupies: `round(sample_rate * duration)`
    pub fn sample_count(&self) -> usize {
        (self.sample_rate as f64 * self.duration as f64).round() as usize
    }

    /// Check every parameter and return the sample count
    pub fn validate(&self) -> Result<usize> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(invalid("frequency", self.frequency as f64));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(invalid("duration", self.duration as f64));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(invalid("volume", self.volume as f64));
        }
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate", 0.0));
        }
        if self.waveform == Waveform::Square && !(self.duty > 0.0 && self.duty < 1.0) {
            return Err(invalid("duty", self.duty as f64));
        }
        self.envelope.validate()?;

        let n = self.sample_count();
        if n == 0 {
            // Too short to produce even one sample at this rate
            return Err(invalid("duration", self.duration as f64));
        }
        Ok(n)
    }

    /// Hashable identity of this tone, used as the cache key
    pub fn key(&self) -> ToneKey {
        ToneKey {
            waveform: self.waveform,
            frequency: self.frequency.to_bits(),
            duration: self.duration.to_bits(),
            volume: self.volume.to_bits(),
            sample_rate: self.sample_rate,
            duty: self.duty.to_bits(),
            envelope: match self.envelope {
                Envelope::Flat => None,
                Envelope::AttackDecay { attack, decay } => {
                    Some((attack.to_bits(), decay.to_bits()))
                }
            },
        }
    }

    fn noise_seed(&self) -> u64 {
        let key = self.key();
        (u64::from(key.frequency) << 32 | u64::from(key.duration))
            ^ u64::from(key.sample_rate).rotate_left(17)
            ^ u64::from(key.volume).rotate_left(43)
    }
}

/// Bit-exact identity of a [`ToneSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToneKey {
    waveform: Waveform,
    frequency: u32,
    duration: u32,
    volume: u32,
    sample_rate: u32,
    duty: u32,
    envelope: Option<(u32, u32)>,
}

/// Immutable interleaved 16-bit PCM samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (one sample per channel each)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Re-lay the buffer out for `channels` outputs.
    ///
    /// The first channel of every frame is duplicated across all output
    /// channels, interleaved frame by frame.
    pub fn to_channels(&self, channels: u16) -> Result<SampleBuffer> {
        if channels == 0 {
            return Err(ArcadeError::InvalidChannels { channels });
        }
        if channels == self.channels {
            return Ok(self.clone());
        }
        let mut samples = Vec::with_capacity(self.frames() * channels as usize);
        for frame in self.samples.chunks_exact(self.channels as usize) {
            samples.extend(std::iter::repeat_n(frame[0], channels as usize));
        }
        Ok(SampleBuffer {
            samples,
            sample_rate: self.sample_rate,
            channels,
        })
    }

    /// Peak absolute sample value
    pub fn peak(&self) -> u16 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Synthesize a mono buffer for `spec`.
///
/// Every sample lies within `±volume * 32767`; quantization truncates toward
/// zero so rounding can never push a sample past that bound.
pub fn synthesize(spec: &ToneSpec) -> Result<SampleBuffer> {
    let n = spec.validate()?;

    let sample_rate = spec.sample_rate as f64;
    let frequency = spec.frequency as f64;
    let duty = spec.duty as f64;
    let amplitude = spec.volume as f64 * MAX_AMPLITUDE;
    let mut rng = Pcg32::seed_from_u64(spec.noise_seed());

    let samples = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let cycles = frequency * t;
            let phase = cycles.fract();
            let raw = match spec.waveform {
                Waveform::Sine => (TAU * cycles).sin(),
                Waveform::Square => {
                    if phase < duty {
                        1.0
                    } else {
                        -1.0
                    }
                }
                Waveform::Triangle => 2.0 * (2.0 * (cycles - (cycles + 0.5).floor())).abs() - 1.0,
                Waveform::Sawtooth => 2.0 * phase - 1.0,
                Waveform::Noise => rng.random_range(-1.0..=1.0),
            };
            (amplitude * raw * spec.envelope.gain(t)) as i16
        })
        .collect();

    Ok(SampleBuffer {
        samples,
        sample_rate: spec.sample_rate,
        channels: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rising_edges(samples: &[i16]) -> Vec<usize> {
        samples
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] < 0 && w[1] > 0)
            .map(|(i, _)| i + 1)
            .collect()
    }

    #[test]
    fn test_square_440_scenario() {
        let spec = ToneSpec::new(Waveform::Square, 440.0, 0.1, 1.0, 44100);
        let buf = synthesize(&spec).unwrap();
        assert_eq!(buf.samples().len(), 4410);
        assert!(buf.samples()[0] > 0);

        let edges = rising_edges(buf.samples());
        assert!(edges.len() > 10);
        let expected = (44100.0_f64 / 440.0).round() as i64;
        for pair in edges.windows(2) {
            let period = (pair[1] - pair[0]) as i64;
            assert!((period - expected).abs() <= 1, "period {period}");
        }
    }

    #[test]
    fn test_square_is_not_sine_or_dc() {
        let spec = ToneSpec::new(Waveform::Square, 200.0, 0.05, 0.5, 22050);
        let buf = synthesize(&spec).unwrap();
        let amp = (0.5 * MAX_AMPLITUDE) as i16;
        assert!(buf.samples().iter().all(|&s| s == amp || s == -amp));
        assert!(buf.samples().contains(&amp));
        assert!(buf.samples().contains(&-amp));
    }

    #[test]
    fn test_duty_cycle_shifts_balance() {
        let spec = ToneSpec::new(Waveform::Square, 100.0, 1.0, 1.0, 10000).with_duty(0.25);
        let buf = synthesize(&spec).unwrap();
        let high = buf.samples().iter().filter(|&&s| s > 0).count();
        let ratio = high as f64 / buf.samples().len() as f64;
        assert!((ratio - 0.25).abs() < 0.01, "ratio {ratio}");
    }

    #[test]
    fn test_sine_starts_at_zero() {
        let spec = ToneSpec::new(Waveform::Sine, 440.0, 0.01, 1.0, 44100);
        let buf = synthesize(&spec).unwrap();
        assert_eq!(buf.samples()[0], 0);
        assert!(buf.peak() > 30000);
    }

    #[test]
    fn test_noise_is_deterministic() {
        let spec = ToneSpec::new(Waveform::Noise, 100.0, 0.15, 0.7, 22050);
        let a = synthesize(&spec).unwrap();
        let b = synthesize(&spec).unwrap();
        assert_eq!(a, b);
        assert!(a.peak() > 0);
    }

    #[test]
    fn test_envelope_fades_to_silence() {
        let spec = ToneSpec::new(Waveform::Sawtooth, 110.0, 0.5, 1.0, 22050).with_envelope(
            Envelope::AttackDecay {
                attack: 0.005,
                decay: 0.4,
            },
        );
        let buf = synthesize(&spec).unwrap();
        // Attack starts silent, decay finishes before the buffer ends
        assert_eq!(buf.samples()[0], 0);
        let tail = &buf.samples()[buf.samples().len() - 100..];
        assert!(tail.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let base = ToneSpec::new(Waveform::Sine, 440.0, 0.1, 0.5, 44100);
        assert!(synthesize(&ToneSpec { duration: 0.0, ..base }).is_err());
        assert!(synthesize(&ToneSpec { duration: -1.0, ..base }).is_err());
        assert!(synthesize(&ToneSpec { sample_rate: 0, ..base }).is_err());
        assert!(synthesize(&ToneSpec { frequency: 0.0, ..base }).is_err());
        assert!(synthesize(&ToneSpec { volume: 1.5, ..base }).is_err());
        assert!(synthesize(&ToneSpec { frequency: f32::NAN, ..base }).is_err());
        // Rounds to zero samples
        assert!(synthesize(&ToneSpec { duration: 1e-6, ..base }).is_err());
        let square = ToneSpec::new(Waveform::Square, 440.0, 0.1, 0.5, 44100);
        assert!(synthesize(&square.with_duty(1.0)).is_err());
    }

    #[test]
    fn test_stereo_duplicates_each_frame() {
        let spec = ToneSpec::new(Waveform::Triangle, 300.0, 0.02, 0.8, 22050);
        let mono = synthesize(&spec).unwrap();
        let stereo = mono.to_channels(2).unwrap();
        assert_eq!(stereo.channels(), 2);
        assert_eq!(stereo.frames(), mono.frames());
        for (frame, &s) in stereo.samples().chunks_exact(2).zip(mono.samples()) {
            assert_eq!(frame, [s, s]);
        }
        assert!(mono.to_channels(0).is_err());
    }

    fn waveform_strategy() -> impl Strategy<Value = Waveform> {
        prop_oneof![
            Just(Waveform::Sine),
            Just(Waveform::Square),
            Just(Waveform::Triangle),
            Just(Waveform::Sawtooth),
            Just(Waveform::Noise),
        ]
    }

    proptest! {
        #[test]
        fn prop_samples_within_volume(
            waveform in waveform_strategy(),
            frequency in 50.0f32..2000.0,
            duration in 0.01f32..0.3,
            volume in 0.0f32..=1.0,
            sample_rate in prop_oneof![Just(22050u32), Just(44100u32)],
        ) {
            let spec = ToneSpec::new(waveform, frequency, duration, volume, sample_rate);
            let buf = synthesize(&spec).unwrap();
            let bound = volume as f64 * MAX_AMPLITUDE;
            for &s in buf.samples() {
                prop_assert!((s as f64).abs() <= bound);
            }
        }

        #[test]
        fn prop_length_independent_of_waveform(
            waveform in waveform_strategy(),
            duration in 0.01f32..0.5,
            sample_rate in 8000u32..48000,
        ) {
            let spec = ToneSpec::new(waveform, 440.0, duration, 0.5, sample_rate);
            let buf = synthesize(&spec).unwrap();
            let expected = (sample_rate as f64 * duration as f64).round();
            prop_assert!((buf.samples().len() as f64 - expected).abs() <= 1.0);
        }
    }
}
