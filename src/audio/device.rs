//! Device seams for the live session
//!
//! The session only ever talks to these traits, so the cpal implementation
//! can be swapped for an in-memory one in tests or on machines without audio.

use crate::audio::mixer::Mixer;
use crate::{AdArchitectError, Result};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Channel the capture device feeds mono sample chunks into
pub type CaptureSender = UnboundedSender<Vec<f32>>;

/// An acquired microphone.
///
/// Acquisition happens when the backend opens the device; samples only flow
/// between `start` and `stop`.
pub trait CaptureDevice: Send {
    fn sample_rate(&self) -> u32;

    /// Begin forwarding mono samples to `tx`
    fn start(&mut self, tx: CaptureSender) -> Result<()>;

    /// Stop forwarding samples and release the hardware tracks
    fn stop(&mut self);

    fn is_capturing(&self) -> bool;
}

/// An opened output context
pub trait PlaybackDevice: Send {
    fn sample_rate(&self) -> u32;

    /// Hand the mixer to the device callback
    fn start(&mut self, mixer: Mixer) -> Result<()>;

    /// Let already scheduled audio finish, then release the device
    fn release(self: Box<Self>);
}

/// Factory for capture and playback contexts at fixed rates
pub trait AudioBackend: Send + Sync {
    fn open_capture(&self, sample_rate: u32) -> Result<Box<dyn CaptureDevice>>;

    fn open_playback(&self, sample_rate: u32) -> Result<Box<dyn PlaybackDevice>>;
}

/// Backend used when audio I/O is compiled out or disabled in config
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn open_capture(&self, _sample_rate: u32) -> Result<Box<dyn CaptureDevice>> {
        Err(AdArchitectError::PermissionDenied(
            "audio input is disabled".to_string(),
        ))
    }

    fn open_playback(&self, _sample_rate: u32) -> Result<Box<dyn PlaybackDevice>> {
        Err(AdArchitectError::AudioDeviceError(
            "audio output is disabled".to_string(),
        ))
    }
}

/// Pick the backend matching the build features and config switches
pub fn default_backend(enable_input: bool, enable_output: bool) -> Arc<dyn AudioBackend> {
    #[cfg(feature = "audio-io")]
    {
        if enable_input && enable_output {
            return Arc::new(crate::audio::CpalBackend::new());
        }
    }

    let _ = (enable_input, enable_output);
    Arc::new(NullBackend)
}
