//! Memoized tone buffers
//!
//! A game only ever asks for a handful of distinct tones, so each one is
//! synthesized once per channel layout and shared afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use super::tone::{SampleBuffer, ToneKey, ToneSpec, synthesize};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct ToneCache {
    buffers: HashMap<(ToneKey, u16), Arc<SampleBuffer>>,
    hits: u64,
    misses: u64,
}

impl ToneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the buffer for `spec` laid out for `channels` outputs,
    /// synthesizing it on first use. Invalid specs are never cached.
    pub fn get_or_synthesize(&mut self, spec: &ToneSpec, channels: u16) -> Result<Arc<SampleBuffer>> {
        let key = (spec.key(), channels);
        if let Some(buf) = self.buffers.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(buf));
        }

        let buf = Arc::new(synthesize(spec)?.to_channels(channels)?);
        self.misses += 1;
        log::debug!(
            "Synthesized {:?} {} Hz x {}s ({} frames, {} ch)",
            spec.waveform,
            spec.frequency,
            spec.duration,
            buf.frames(),
            channels
        );
        self.buffers.insert(key, Arc::clone(&buf));
        Ok(buf)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}
