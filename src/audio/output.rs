use crate::audio::device::PlaybackDevice;
use crate::audio::input::select_config;
use crate::audio::mixer::Mixer;
use crate::{AdArchitectError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Longest time a released output keeps playing queued audio
const DRAIN_GRACE: Duration = Duration::from_secs(30);
const DRAIN_POLL: Duration = Duration::from_millis(20);

/// Speaker output at a fixed sample rate, rendering a [`Mixer`].
///
/// Like [`crate::audio::AudioInput`], the cpal stream is owned by a
/// dedicated thread.
pub struct AudioOutput {
    sample_rate: u32,
    mixer: Arc<Mutex<Option<Mixer>>>,
    pending: Arc<Mutex<Option<Arc<AtomicUsize>>>>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl AudioOutput {
    /// Open the default output device at `sample_rate`
    pub fn open(sample_rate: u32) -> Result<Self> {
        let mixer: Arc<Mutex<Option<Mixer>>> = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread_mixer = Arc::clone(&mixer);

        let worker = thread::Builder::new()
            .name("adarchitect-playback".to_string())
            .spawn(move || {
                let stream = match build_output_stream(sample_rate, thread_mixer) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(AdArchitectError::AudioDeviceError(format!(
                        "Failed to start output stream: {}",
                        e
                    ))));
                    return;
                }

                let _ = ready_tx.send(Ok(()));
                let _ = stop_rx.recv();
                drop(stream);
                debug!("Playback thread released output device");
            })
            .map_err(|e| AdArchitectError::AudioDeviceError(format!("Failed to spawn playback thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(AdArchitectError::AudioDeviceError(
                    "Playback thread exited during setup".to_string(),
                ));
            }
        }

        info!("Output device opened at {} Hz", sample_rate);

        Ok(Self {
            sample_rate,
            mixer,
            pending: Arc::new(Mutex::new(None)),
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!("Stopped audio playback");
        }
    }
}

impl PlaybackDevice for AudioOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start(&mut self, mixer: Mixer) -> Result<()> {
        *self.pending.lock() = Some(mixer.pending_handle());
        *self.mixer.lock() = Some(mixer);
        info!("Started audio playback");
        Ok(())
    }

    fn release(mut self: Box<Self>) {
        // Queued audio keeps playing; the device is dropped once the mixer drains
        let pending = self.pending.lock().clone();
        let mixer = Arc::clone(&self.mixer);
        let stop_tx = self.stop_tx.take();
        let worker = self.worker.take();

        let spawned = thread::Builder::new()
            .name("adarchitect-playback-drain".to_string())
            .spawn(move || {
                let started = Instant::now();
                loop {
                    let drained = mixer.lock().as_ref().map(Mixer::is_drained).unwrap_or(true)
                        && pending
                            .as_ref()
                            .map(|p| p.load(Ordering::Acquire) == 0)
                            .unwrap_or(true);
                    if drained {
                        break;
                    }
                    if started.elapsed() > DRAIN_GRACE {
                        warn!("Playback did not drain within {:?}, cutting output", DRAIN_GRACE);
                        break;
                    }
                    thread::sleep(DRAIN_POLL);
                }

                if let Some(stop_tx) = stop_tx {
                    let _ = stop_tx.send(());
                }
                if let Some(worker) = worker {
                    let _ = worker.join();
                }
                debug!("Output released after drain");
            });

        if let Err(e) = spawned {
            error!("Failed to spawn playback drain thread: {}", e);
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn build_output_stream(sample_rate: u32, mixer: Arc<Mutex<Option<Mixer>>>) -> Result<cpal::Stream> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or_else(|| AdArchitectError::AudioDeviceError("No output device available".into()))?;

    info!("Using output device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

    let ranges = device
        .supported_output_configs()
        .map_err(|e| AdArchitectError::AudioDeviceError(format!("Failed to query output device: {}", e)))?;

    let config = select_config(ranges, sample_rate).ok_or_else(|| {
        AdArchitectError::AudioDeviceError(format!("Output device cannot play at {} Hz", sample_rate))
    })?;

    let channels = config.channels as usize;

    let err_fn = |err| {
        error!("Audio output stream error: {}", err);
    };

    device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                match mixer.lock().as_mut() {
                    Some(mixer) => mixer.render(data, channels),
                    // Fill with silence until the session hands over its mixer
                    None => data.fill(0.0),
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| AdArchitectError::AudioDeviceError(format!("Failed to build output stream: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mixer::FrameClock;
    use crossbeam_channel::unbounded;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_playback_release() {
        // This test might fail in CI environments without audio devices
        if let Ok(mut output) = AudioOutput::open(24000) {
            assert_eq!(output.sample_rate(), 24000);

            let (_tx, rx) = unbounded();
            let (ended_tx, _ended_rx) = unbounded_channel();
            let mixer = Mixer::new(FrameClock::new(24000), rx, ended_tx);
            assert!(output.start(mixer).is_ok());

            Box::new(output).release();
        }
    }
}
