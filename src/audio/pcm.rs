//! PCM16 codec for the live wire format
//!
//! Outgoing microphone windows are quantized to signed 16-bit little-endian
//! samples and base64-encoded. Incoming model audio takes the reverse path.

use crate::{AdArchitectError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Decoded audio ready for playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    /// Interleaved samples in [-1.0, 1.0)
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Quantize a float sample to PCM16.
///
/// The sample is clamped before scaling so full-scale input cannot overflow.
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Convert a PCM16 sample back to float.
pub fn dequantize(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

/// Quantize a window of float samples into little-endian PCM16 bytes
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&quantize(sample).to_le_bytes());
    }
    bytes
}

/// Reinterpret little-endian byte pairs as PCM16 samples
pub fn decode_pcm16(bytes: &[u8]) -> Result<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return Err(AdArchitectError::ProtocolError(format!(
            "PCM16 payload has odd length {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode a capture window as a base64 PCM16 payload
pub fn encode_frame(samples: &[f32]) -> String {
    STANDARD.encode(encode_pcm16(samples))
}

/// Decode a base64 PCM16 payload into playable audio
pub fn decode_frame(payload: &str, sample_rate: u32, channels: u16) -> Result<AudioData> {
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AdArchitectError::ProtocolError(format!("Invalid base64 audio: {}", e)))?;

    let samples = decode_pcm16(&bytes)?
        .into_iter()
        .map(dequantize)
        .collect();

    Ok(AudioData::new(samples, sample_rate, channels))
}

/// Root-mean-square amplitude of a window
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
