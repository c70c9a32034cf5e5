use crate::audio::device::{CaptureDevice, CaptureSender};
use crate::{AdArchitectError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, PlayStreamError, SampleFormat, SampleRate, StreamConfig};
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Microphone capture at a fixed sample rate.
///
/// cpal streams are not `Send`, so the stream lives on its own thread for
/// the lifetime of this handle. Opening the handle acquires the device;
/// samples are forwarded only while capturing.
pub struct AudioInput {
    sample_rate: u32,
    sink: Arc<Mutex<Option<CaptureSender>>>,
    is_capturing: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl AudioInput {
    /// Acquire the default input device at `sample_rate`
    pub fn open(sample_rate: u32) -> Result<Self> {
        let sink: Arc<Mutex<Option<CaptureSender>>> = Arc::new(Mutex::new(None));
        let is_capturing = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread_sink = Arc::clone(&sink);
        let thread_capturing = Arc::clone(&is_capturing);

        let worker = thread::Builder::new()
            .name("adarchitect-capture".to_string())
            .spawn(move || {
                let stream = match build_input_stream(sample_rate, thread_sink, thread_capturing) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(map_play_error(e)));
                    return;
                }

                let _ = ready_tx.send(Ok(()));

                // Park until the handle asks us to release the device
                let _ = stop_rx.recv();
                drop(stream);
                debug!("Capture thread released input device");
            })
            .map_err(|e| AdArchitectError::AudioDeviceError(format!("Failed to spawn capture thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(AdArchitectError::AudioDeviceError(
                    "Capture thread exited during setup".to_string(),
                ));
            }
        }

        info!("Microphone acquired at {} Hz", sample_rate);

        Ok(Self {
            sample_rate,
            sink,
            is_capturing,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

impl CaptureDevice for AudioInput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start(&mut self, tx: CaptureSender) -> Result<()> {
        if self.stop_tx.is_none() {
            return Err(AdArchitectError::AudioDeviceError(
                "Microphone already released".to_string(),
            ));
        }
        if self.is_capturing.load(Ordering::SeqCst) {
            warn!("Already capturing");
            return Ok(());
        }

        *self.sink.lock() = Some(tx);
        self.is_capturing.store(true, Ordering::SeqCst);
        info!("Started microphone capture");
        Ok(())
    }

    fn stop(&mut self) {
        self.is_capturing.store(false, Ordering::SeqCst);
        self.sink.lock().take();

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!("Stopped microphone capture");
        }
    }

    fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_input_stream(
    sample_rate: u32,
    sink: Arc<Mutex<Option<CaptureSender>>>,
    is_capturing: Arc<AtomicBool>,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| AdArchitectError::PermissionDenied("No input device available".into()))?;

    info!("Using input device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

    let ranges = device
        .supported_input_configs()
        .map_err(|e| AdArchitectError::PermissionDenied(format!("Failed to query input device: {}", e)))?;

    let config = select_config(ranges, sample_rate).ok_or_else(|| {
        AdArchitectError::AudioDeviceError(format!("Input device cannot capture at {} Hz", sample_rate))
    })?;

    let channels = config.channels as usize;

    // Dropping the sink ends the session's capture channel
    let err_sink = Arc::clone(&sink);
    let err_fn = move |err| {
        error!("Audio input stream error: {}", err);
        err_sink.lock().take();
    };

    device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if !is_capturing.load(Ordering::Relaxed) {
                    return;
                }

                // Convert to mono if necessary
                let samples = if channels == 1 {
                    data.to_vec()
                } else {
                    data.chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                        .collect()
                };

                if let Some(tx) = sink.lock().as_ref() {
                    if tx.send(samples).is_err() {
                        debug!("Capture receiver dropped");
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(map_build_error)
}

/// Choose an f32 config that runs at exactly `sample_rate`, preferring fewer channels
pub(crate) fn select_config(
    ranges: impl Iterator<Item = cpal::SupportedStreamConfigRange>,
    sample_rate: u32,
) -> Option<StreamConfig> {
    ranges
        .filter(|range| {
            range.sample_format() == SampleFormat::F32
                && range.min_sample_rate().0 <= sample_rate
                && sample_rate <= range.max_sample_rate().0
        })
        .min_by_key(|range| range.channels())
        .map(|range| range.with_sample_rate(SampleRate(sample_rate)).config())
}

fn map_build_error(e: BuildStreamError) -> AdArchitectError {
    match e {
        BuildStreamError::DeviceNotAvailable => {
            AdArchitectError::PermissionDenied("Input device not available".to_string())
        }
        other => AdArchitectError::AudioDeviceError(format!("Failed to build input stream: {}", other)),
    }
}

fn map_play_error(e: PlayStreamError) -> AdArchitectError {
    match e {
        PlayStreamError::DeviceNotAvailable => {
            AdArchitectError::PermissionDenied("Input device not available".to_string())
        }
        other => AdArchitectError::AudioDeviceError(format!("Failed to start input stream: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::{SupportedBufferSize, SupportedStreamConfigRange};
    use tokio::sync::mpsc::unbounded_channel;

    fn range(channels: u16, min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(min),
            SampleRate(max),
            SupportedBufferSize::Unknown,
            format,
        )
    }

    #[test]
    fn test_select_config_prefers_mono_f32() {
        let ranges = vec![
            range(2, 8000, 48000, SampleFormat::F32),
            range(1, 8000, 48000, SampleFormat::I16),
            range(1, 8000, 48000, SampleFormat::F32),
        ];

        let config = select_config(ranges.into_iter(), 16000).unwrap();
        assert_eq!(config.channels, 1);
        assert_eq!(config.sample_rate, SampleRate(16000));
    }

    #[test]
    fn test_select_config_rejects_unsupported_rate() {
        let ranges = vec![range(2, 44100, 48000, SampleFormat::F32)];
        assert!(select_config(ranges.into_iter(), 16000).is_none());
    }

    #[test]
    fn test_capture_state() {
        // This test might fail in CI environments without audio devices
        if let Ok(mut input) = AudioInput::open(16000) {
            assert!(!input.is_capturing());

            let (tx, _rx) = unbounded_channel();
            if input.start(tx).is_ok() {
                assert!(input.is_capturing());

                input.stop();
                assert!(!input.is_capturing());
            }
        }
    }
}
