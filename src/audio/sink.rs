//! Audio output boundary
//!
//! The platform mixer lives outside this crate. A sink reports the format it
//! was initialized with and accepts fire-and-forget one-shot buffers.

use std::sync::Arc;

use super::tone::SampleBuffer;

pub trait AudioSink {
    /// Channel count the mixer was opened with
    fn channels(&self) -> u16;

    /// Sample rate the mixer was opened with
    fn sample_rate(&self) -> u32;

    /// Start playing `buffer` once; the caller keeps no handle
    fn play_one_shot(&mut self, buffer: Arc<SampleBuffer>);
}

/// Discards everything (audio disabled)
#[derive(Debug, Clone, Copy)]
pub struct NullSink {
    pub channels: u16,
    pub sample_rate: u32,
}

impl Default for NullSink {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 22050,
        }
    }
}

impl AudioSink for NullSink {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play_one_shot(&mut self, _buffer: Arc<SampleBuffer>) {}
}

/// Keeps every buffer it is handed, for headless runs and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    channels: u16,
    sample_rate: u32,
    played: Vec<Arc<SampleBuffer>>,
}

impl MemorySink {
    pub fn new(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            played: Vec::new(),
        }
    }

    pub fn played(&self) -> &[Arc<SampleBuffer>] {
        &self.played
    }

    /// Total audio time queued so far (seconds)
    pub fn total_duration(&self) -> f32 {
        self.played.iter().map(|b| b.duration_secs()).sum()
    }
}

impl AudioSink for MemorySink {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play_one_shot(&mut self, buffer: Arc<SampleBuffer>) {
        self.played.push(buffer);
    }
}
