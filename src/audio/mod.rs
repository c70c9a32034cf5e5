pub mod buffer;
pub mod device;
#[cfg(feature = "audio-io")]
pub mod input;
pub mod mixer;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod pcm;

pub use buffer::CaptureWindow;
pub use device::{default_backend, AudioBackend, CaptureDevice, CaptureSender, NullBackend, PlaybackDevice};
#[cfg(feature = "audio-io")]
pub use input::AudioInput;
pub use mixer::{FrameClock, Mixer, OutputClock, ScheduledBuffer};
#[cfg(feature = "audio-io")]
pub use output::AudioOutput;
pub use pcm::{decode_frame, decode_pcm16, dequantize, encode_frame, encode_pcm16, quantize, rms, AudioData};

/// Microphone rate expected by the live model
pub const INPUT_SAMPLE_RATE: u32 = 16000;

/// Rate of audio the live model speaks back
pub const OUTPUT_SAMPLE_RATE: u32 = 24000;

/// Samples per outgoing capture window
pub const CAPTURE_WINDOW: usize = 4096;

/// Multiplier from window RMS to the 0..100-ish volume indicator
pub const VOLUME_SCALE: f32 = 50.0;

/// MIME type announced for outgoing microphone chunks
pub const INPUT_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// Audio backend over the host's default cpal devices
#[cfg(feature = "audio-io")]
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

#[cfg(feature = "audio-io")]
impl CpalBackend {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "audio-io")]
impl AudioBackend for CpalBackend {
    fn open_capture(&self, sample_rate: u32) -> crate::Result<Box<dyn CaptureDevice>> {
        Ok(Box::new(AudioInput::open(sample_rate)?))
    }

    fn open_playback(&self, sample_rate: u32) -> crate::Result<Box<dyn PlaybackDevice>> {
        Ok(Box::new(AudioOutput::open(sample_rate)?))
    }
}
