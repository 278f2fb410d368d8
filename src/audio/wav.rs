//! RIFF/WAVE export for synthesized buffers (16-bit PCM)

use std::fs;
use std::path::Path;

use super::tone::SampleBuffer;
use crate::error::Result;

const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;

/// Encode `buffer` as a complete WAV file image
pub fn encode(buffer: &SampleBuffer) -> Vec<u8> {
    let channels = buffer.channels();
    let sample_rate = buffer.sample_rate();
    let byte_rate = sample_rate * u32::from(channels) * u32::from(BITS_PER_SAMPLE) / 8;
    let block_align = channels * BITS_PER_SAMPLE / 8;
    let data_size = (buffer.samples().len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut bytes = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF header
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt chunk
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_size.to_le_bytes());
    for sample in buffer.samples() {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    bytes
}

/// Write `buffer` to `path` as a WAV file
pub fn write(path: &Path, buffer: &SampleBuffer) -> Result<()> {
    fs::write(path, encode(buffer))?;
    log::info!("Wrote {} ({} frames)", path.display(), buffer.frames());
    Ok(())
}
