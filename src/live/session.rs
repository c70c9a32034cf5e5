//! Realtime voice session
//!
//! Connecting acquires the microphone and the speaker, opens the link, and
//! spawns a single driver task that owns every piece of mutable session
//! state. Capture starts when the server acknowledges the setup; incoming
//! audio is scheduled back-to-back on the output clock.

use crate::audio::buffer::CaptureWindow;
use crate::audio::device::{AudioBackend, CaptureDevice, CaptureSender, PlaybackDevice};
use crate::audio::mixer::{FrameClock, Mixer};
use crate::audio::pcm::{decode_frame, encode_frame, rms};
use crate::audio::INPUT_MIME_TYPE;
use crate::integration::config::LiveConfig;
use crate::live::protocol::{ClientMessage, ServerEvent, Setup};
use crate::live::scheduler::PlaybackScheduler;
use crate::live::state::SharedSessionState;
use crate::live::transport::{LinkEvent, LiveConnector, LiveLink};
use crate::{AdArchitectError, Result};
use crossbeam_channel::{unbounded, Sender, TrySendError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Capture windows buffered before the oldest samples are dropped
const CAPTURE_BACKLOG: usize = 8;

/// Events published by a live session
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// Devices and link are being opened
    Connecting,

    /// The server accepted the session; the microphone is live
    Connected,

    /// Connect failed before the session started
    ConnectFailed(String),

    /// The user ended the session
    Disconnected,

    /// The remote closed the session
    Closed(Option<String>),

    /// The session died mid-flight; reconnecting is up to the user
    TransportError(String),

    /// Text the model produced alongside its audio
    Transcript(String),

    TurnComplete,

    Interrupted,
}

/// Publish without ever blocking the driver
pub(crate) fn emit(events: &Sender<LiveEvent>, event: LiveEvent) {
    match events.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => warn!("Live event queue full, dropping {:?}", event),
        Err(TrySendError::Disconnected(_)) => debug!("No live event listener"),
    }
}

/// An open live session.
///
/// Dropping the session without calling [`LiveSession::disconnect`] still
/// stops the driver, but does not wait for it.
pub struct LiveSession {
    shutdown: Option<oneshot::Sender<()>>,
    driver: Option<JoinHandle<()>>,
    state: SharedSessionState,
}

impl LiveSession {
    /// Acquire the devices, open the link, and start the session driver.
    ///
    /// Returns once the link is established; `connected` turns true when the
    /// server acknowledges the setup. On failure every device opened so far
    /// is released and the state is left disconnected.
    pub async fn connect(
        config: &LiveConfig,
        backend: &dyn AudioBackend,
        connector: &dyn LiveConnector,
        state: SharedSessionState,
        events: Sender<LiveEvent>,
    ) -> Result<Self> {
        state.update(|s| {
            s.reset();
            s.last_error = None;
            s.connecting = true;
        });
        emit(&events, LiveEvent::Connecting);

        let mut capture = match backend.open_capture(config.input_sample_rate) {
            Ok(capture) => capture,
            Err(e) => return Err(abort_connect(&state, &events, e)),
        };

        let mut playback = match backend.open_playback(config.output_sample_rate) {
            Ok(playback) => playback,
            Err(e) => {
                capture.stop();
                return Err(abort_connect(&state, &events, e));
            }
        };

        let instruction = config.system_instruction();
        let setup = Setup::audio(&config.model, &config.voice, Some(instruction.as_str()));
        let link = match connector.connect(setup).await {
            Ok(link) => link,
            Err(e) => {
                capture.stop();
                playback.release();
                return Err(abort_connect(&state, &events, e));
            }
        };

        let clock = FrameClock::new(config.output_sample_rate);
        let (buffer_tx, buffer_rx) = unbounded();
        let (ended_tx, ended_rx) = unbounded_channel();

        if let Err(e) = playback.start(Mixer::new(clock.clone(), buffer_rx, ended_tx)) {
            capture.stop();
            playback.release();
            link.close();
            return Err(abort_connect(&state, &events, e));
        }

        let (capture_tx, capture_rx) = unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let driver = SessionDriver {
            link,
            capture: Some(capture),
            capture_tx: Some(capture_tx),
            capture_rx,
            capturing: false,
            playback: Some(playback),
            playback_alive: true,
            scheduler: PlaybackScheduler::new(clock, config.output_sample_rate, buffer_tx),
            ended_rx,
            window: CaptureWindow::new(config.capture_window, CAPTURE_BACKLOG),
            output_sample_rate: config.output_sample_rate,
            volume_scale: config.volume_scale,
            opened: false,
            state: state.clone(),
            events,
        };

        info!("Live link established, waiting for setup acknowledgement");
        let driver = tokio::spawn(driver.run(shutdown_rx));

        Ok(Self {
            shutdown: Some(shutdown_tx),
            driver: Some(driver),
            state,
        })
    }

    /// Stop the microphone and close the link.
    ///
    /// Audio already scheduled keeps playing until it drains.
    pub async fn disconnect(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                error!("Live session driver failed: {}", e);
                self.state.update(|s| s.reset());
            }
        }
    }

    /// True once the session ended on its own (close or transport error)
    pub fn is_finished(&self) -> bool {
        self.driver.as_ref().map(|d| d.is_finished()).unwrap_or(true)
    }

    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }
}

fn abort_connect(
    state: &SharedSessionState,
    events: &Sender<LiveEvent>,
    err: AdArchitectError,
) -> AdArchitectError {
    warn!("Live connect failed: {}", err);
    state.update(|s| {
        s.reset();
        s.last_error = Some(err.user_message());
    });
    emit(events, LiveEvent::ConnectFailed(err.to_string()));
    err
}

enum Step {
    Shutdown,
    Link(Option<LinkEvent>),
    Captured(Option<Vec<f32>>),
    Ended(Option<u64>),
}

enum Ending {
    Disconnected,
    Rejected(AdArchitectError),
    Closed(Option<String>),
    Failed(String),
}

struct SessionDriver {
    link: LiveLink,
    capture: Option<Box<dyn CaptureDevice>>,
    capture_tx: Option<CaptureSender>,
    capture_rx: UnboundedReceiver<Vec<f32>>,
    capturing: bool,
    playback: Option<Box<dyn PlaybackDevice>>,
    playback_alive: bool,
    scheduler: PlaybackScheduler<FrameClock>,
    ended_rx: UnboundedReceiver<u64>,
    window: CaptureWindow,
    output_sample_rate: u32,
    volume_scale: f32,
    opened: bool,
    state: SharedSessionState,
    events: Sender<LiveEvent>,
}

impl SessionDriver {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let ending = loop {
            let step = tokio::select! {
                _ = &mut shutdown => Step::Shutdown,
                event = self.link.recv() => Step::Link(event),
                chunk = self.capture_rx.recv(), if self.capturing => Step::Captured(chunk),
                id = self.ended_rx.recv(), if self.playback_alive => Step::Ended(id),
            };

            match step {
                Step::Shutdown => break Ending::Disconnected,
                Step::Link(Some(LinkEvent::Open)) => {
                    if let Err(e) = self.on_open() {
                        break Ending::Failed(e.to_string());
                    }
                }
                Step::Link(Some(LinkEvent::Message(event))) => self.on_message(event),
                // The server refused the setup
                Step::Link(Some(LinkEvent::Closed(reason))) if !self.opened => {
                    break Ending::Rejected(AdArchitectError::ConnectionFailed(
                        reason.unwrap_or_else(|| "Link closed before setup completed".to_string()),
                    ));
                }
                Step::Link(Some(LinkEvent::Error(e))) if !self.opened => {
                    break Ending::Rejected(AdArchitectError::ConnectionFailed(e));
                }
                Step::Link(None) if !self.opened => {
                    break Ending::Rejected(AdArchitectError::ConnectionFailed(
                        "Link dropped before setup completed".to_string(),
                    ));
                }
                Step::Link(Some(LinkEvent::Closed(reason))) => break Ending::Closed(reason),
                Step::Link(Some(LinkEvent::Error(e))) => break Ending::Failed(e),
                Step::Link(None) => break Ending::Closed(None),
                Step::Captured(Some(chunk)) => {
                    if let Err(e) = self.on_capture(&chunk) {
                        break Ending::Failed(e.to_string());
                    }
                }
                Step::Captured(None) => {
                    warn!("Microphone stream ended mid-session");
                    break Ending::Failed(
                        AdArchitectError::AudioDeviceError("Microphone stream ended".to_string()).to_string(),
                    );
                }
                Step::Ended(Some(id)) => self.on_playback_ended(id),
                Step::Ended(None) => self.playback_alive = false,
            }
        };

        self.teardown(ending);
    }

    fn on_open(&mut self) -> Result<()> {
        if self.opened {
            debug!("Ignoring repeated open");
            return Ok(());
        }
        self.opened = true;

        if let (Some(capture), Some(tx)) = (self.capture.as_mut(), self.capture_tx.take()) {
            capture.start(tx)?;
            self.capturing = true;
        }

        self.state.update(|s| {
            s.connecting = false;
            s.connected = true;
        });
        emit(&self.events, LiveEvent::Connected);
        info!("Live session open, microphone streaming");
        Ok(())
    }

    fn on_capture(&mut self, chunk: &[f32]) -> Result<()> {
        self.window.push(chunk);

        while let Some(window) = self.window.next_window() {
            let volume = rms(&window) * self.volume_scale;
            let message = ClientMessage::audio(INPUT_MIME_TYPE, encode_frame(&window));

            self.link.send(&message)?;
            self.state.update(|s| {
                s.volume = volume;
                s.frames_sent += 1;
            });
        }
        Ok(())
    }

    fn on_message(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Audio { data, mime_type } => {
                let audio = match decode_frame(&data, self.output_sample_rate, 1) {
                    Ok(audio) => audio,
                    Err(e) => {
                        warn!("Dropping {} frame: {}", mime_type, e);
                        return;
                    }
                };
                if audio.is_empty() {
                    return;
                }

                match self.scheduler.schedule(audio.samples) {
                    Ok(_) => self.state.update(|s| {
                        s.speaking = true;
                        s.frames_received += 1;
                    }),
                    Err(e) => warn!("Could not schedule model audio: {}", e),
                }
            }
            ServerEvent::Text(text) => emit(&self.events, LiveEvent::Transcript(text)),
            ServerEvent::TurnComplete => emit(&self.events, LiveEvent::TurnComplete),
            ServerEvent::Interrupted => emit(&self.events, LiveEvent::Interrupted),
            ServerEvent::GoAway => info!("Server announced it will close the session"),
            ServerEvent::SetupComplete | ServerEvent::Unknown => {}
        }
    }

    fn on_playback_ended(&mut self, id: u64) {
        self.scheduler.finish(id);
        let speaking = self.scheduler.is_speaking();
        self.state.update(|s| s.speaking = speaking);
    }

    fn teardown(mut self, ending: Ending) {
        if let Some(mut capture) = self.capture.take() {
            capture.stop();
        }
        self.capturing = false;
        self.link.close();
        if let Some(playback) = self.playback.take() {
            playback.release();
        }
        self.scheduler.clear();

        let event = match ending {
            Ending::Disconnected => {
                info!("Live session disconnected");
                self.state.update(|s| {
                    s.reset();
                    s.last_error = None;
                });
                LiveEvent::Disconnected
            }
            Ending::Rejected(err) => {
                warn!("Live session rejected before setup: {}", err);
                self.state.update(|s| {
                    s.reset();
                    s.last_error = Some(err.user_message());
                });
                LiveEvent::ConnectFailed(err.to_string())
            }
            Ending::Closed(reason) => {
                info!("Live session closed by server: {:?}", reason);
                self.state.update(|s| s.reset());
                LiveEvent::Closed(reason)
            }
            Ending::Failed(message) => {
                error!("Live session failed: {}", message);
                self.state.update(|s| {
                    s.reset();
                    s.last_error = Some(message.clone());
                });
                LiveEvent::TransportError(message)
            }
        };

        emit(&self.events, event);
    }
}
