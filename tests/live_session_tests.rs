//! Integration tests for the live session bridge
//!
//! Sessions run against an in-memory link and a fake audio backend whose
//! mixer the tests render by hand, so no network or hardware is needed.

use adarchitect::audio::device::{AudioBackend, CaptureDevice, CaptureSender, PlaybackDevice};
use adarchitect::audio::mixer::Mixer;
use adarchitect::integration::LiveConfig;
use adarchitect::live::{
    ClientMessage, LiveConnector, LiveController, LiveEvent, LiveLink, LiveSession, Outbound, RemoteEnd, Setup,
    SharedSessionState,
};
use adarchitect::{AdArchitectError, Result};
use async_trait::async_trait;
use base64::Engine;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

// ---- fakes ----

#[derive(Default)]
struct Probe {
    captures_open: usize,
    playbacks_open: usize,
    capture_tx: Option<CaptureSender>,
    mixer: Option<Mixer>,
}

struct FakeCapture {
    probe: Arc<Mutex<Probe>>,
    open: bool,
    capturing: bool,
}

impl CaptureDevice for FakeCapture {
    fn sample_rate(&self) -> u32 {
        16000
    }

    fn start(&mut self, tx: CaptureSender) -> Result<()> {
        self.probe.lock().capture_tx = Some(tx);
        self.capturing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.capturing = false;
        if self.open {
            self.open = false;
            let mut probe = self.probe.lock();
            probe.captures_open -= 1;
            probe.capture_tx = None;
        }
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }
}

struct FakePlayback {
    probe: Arc<Mutex<Probe>>,
}

impl PlaybackDevice for FakePlayback {
    fn sample_rate(&self) -> u32 {
        24000
    }

    fn start(&mut self, mixer: Mixer) -> Result<()> {
        self.probe.lock().mixer = Some(mixer);
        Ok(())
    }

    fn release(self: Box<Self>) {
        self.probe.lock().playbacks_open -= 1;
    }
}

#[derive(Clone, Default)]
struct FakeBackend {
    probe: Arc<Mutex<Probe>>,
    deny_microphone: bool,
}

impl AudioBackend for FakeBackend {
    fn open_capture(&self, _sample_rate: u32) -> Result<Box<dyn CaptureDevice>> {
        if self.deny_microphone {
            return Err(AdArchitectError::PermissionDenied("denied by test".to_string()));
        }
        self.probe.lock().captures_open += 1;
        Ok(Box::new(FakeCapture {
            probe: Arc::clone(&self.probe),
            open: true,
            capturing: false,
        }))
    }

    fn open_playback(&self, _sample_rate: u32) -> Result<Box<dyn PlaybackDevice>> {
        self.probe.lock().playbacks_open += 1;
        Ok(Box::new(FakePlayback {
            probe: Arc::clone(&self.probe),
        }))
    }
}

/// Hands out one pre-built link and records the setup it was asked to send
#[derive(Default)]
struct FakeConnector {
    link: Mutex<Option<LiveLink>>,
    setups: Mutex<Vec<Setup>>,
}

impl FakeConnector {
    fn with_link(link: LiveLink) -> Self {
        Self {
            link: Mutex::new(Some(link)),
            setups: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LiveConnector for FakeConnector {
    async fn connect(&self, setup: Setup) -> Result<LiveLink> {
        self.setups.lock().push(setup);
        self.link
            .lock()
            .take()
            .ok_or_else(|| AdArchitectError::ConnectionFailed("unreachable".to_string()))
    }
}

// ---- helpers ----

struct Harness {
    backend: FakeBackend,
    connector: FakeConnector,
    remote: RemoteEnd,
    state: SharedSessionState,
    events: Receiver<LiveEvent>,
    events_tx: crossbeam_channel::Sender<LiveEvent>,
}

impl Harness {
    fn new() -> Self {
        let (link, remote) = LiveLink::pair();
        let (events_tx, events) = crossbeam_channel::bounded(256);
        Self {
            backend: FakeBackend::default(),
            connector: FakeConnector::with_link(link),
            remote,
            state: SharedSessionState::new(),
            events,
            events_tx,
        }
    }

    async fn connect(&self) -> Result<LiveSession> {
        LiveSession::connect(
            &LiveConfig::default(),
            &self.backend,
            &self.connector,
            self.state.clone(),
            self.events_tx.clone(),
        )
        .await
    }

    /// Connect and let the server acknowledge the setup
    async fn open(&self) -> LiveSession {
        let session = self.connect().await.unwrap();
        self.remote.open();
        let state = self.state.clone();
        wait_until(move || state.is_connected()).await;
        session
    }

    fn events(&self) -> Vec<LiveEvent> {
        self.events.try_iter().collect()
    }

    fn render(&self, frames: usize) {
        let mut block = vec![0.0f32; frames];
        if let Some(mixer) = self.probe().mixer.as_mut() {
            mixer.render(&mut block, 1);
        }
    }

    fn probe(&self) -> parking_lot::MutexGuard<'_, Probe> {
        self.backend.probe.lock()
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

fn audio_message(bytes: &[u8]) -> String {
    json!({
        "serverContent": {
            "modelTurn": {
                "parts": [{
                    "inlineData": {
                        "mimeType": "audio/pcm;rate=24000",
                        "data": base64::engine::general_purpose::STANDARD.encode(bytes)
                    }
                }]
            }
        }
    })
    .to_string()
}

async fn next_message(remote: &mut RemoteEnd) -> Value {
    loop {
        match tokio::time::timeout(Duration::from_secs(2), remote.next_sent())
            .await
            .expect("client sent nothing")
        {
            Some(Outbound::Message(json)) => return serde_json::from_str(&json).unwrap(),
            Some(Outbound::Close) => panic!("link closed before a message was sent"),
            None => panic!("link dropped"),
        }
    }
}

// ---- tests ----

#[tokio::test]
async fn test_denied_microphone_leaves_nothing_open() {
    let mut harness = Harness::new();
    harness.backend.deny_microphone = true;

    let err = harness.connect().await.err().unwrap();

    assert!(matches!(err, AdArchitectError::PermissionDenied(_)));
    assert!(!harness.state.is_connected());
    assert!(!harness.state.read().connecting);
    assert_eq!(harness.probe().captures_open, 0);
    assert_eq!(harness.probe().playbacks_open, 0);
    assert!(harness.connector.setups.lock().is_empty());
    assert!(harness
        .events()
        .iter()
        .any(|e| matches!(e, LiveEvent::ConnectFailed(_))));
}

#[tokio::test]
async fn test_connection_failure_releases_devices() {
    let harness = Harness::new();
    harness.connector.link.lock().take();

    let err = harness.connect().await.err().unwrap();

    assert!(matches!(err, AdArchitectError::ConnectionFailed(_)));
    assert_eq!(harness.probe().captures_open, 0);
    assert_eq!(harness.probe().playbacks_open, 0);
    assert!(!harness.state.is_connected());
    assert!(harness.state.read().last_error.is_some());
}

#[tokio::test]
async fn test_setup_requests_audio_with_kore_voice() {
    let harness = Harness::new();
    let _session = harness.connect().await.unwrap();

    let setup = harness.connector.setups.lock().pop().unwrap();
    let value: Value = serde_json::from_str(&ClientMessage::setup(setup).to_json().unwrap()).unwrap();

    assert_eq!(
        value["setup"]["generationConfig"]["responseModalities"],
        json!(["AUDIO"])
    );
    assert_eq!(
        value["setup"]["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
        "Kore"
    );
}

#[tokio::test]
async fn test_capture_waits_for_open() {
    let harness = Harness::new();
    let _session = harness.connect().await.unwrap();

    assert!(harness.state.read().connecting);
    assert!(!harness.state.is_connected());
    assert!(harness.probe().capture_tx.is_none());

    harness.remote.open();
    let state = harness.state.clone();
    wait_until(move || state.is_connected()).await;

    assert!(harness.probe().capture_tx.is_some());
    assert!(harness.events().contains(&LiveEvent::Connected));
}

#[tokio::test]
async fn test_silent_window_becomes_one_frame() {
    let mut harness = Harness::new();
    let _session = harness.open().await;

    let tx = harness.probe().capture_tx.clone().unwrap();
    tx.send(vec![0.0; 1000]).unwrap();
    tx.send(vec![0.0; 3096]).unwrap();

    let frame = next_message(&mut harness.remote).await;
    let chunk = &frame["realtimeInput"]["mediaChunks"][0];
    assert_eq!(chunk["mimeType"], "audio/pcm;rate=16000");
    assert_eq!(chunk["data"].as_str().unwrap().len(), 10924);

    let state = harness.state.clone();
    wait_until(move || state.read().frames_sent == 1).await;
    assert_eq!(harness.state.volume(), 0.0);
    assert!(harness.remote.try_next_sent().is_none());
}

#[tokio::test]
async fn test_model_audio_toggles_speaking() {
    let harness = Harness::new();
    let _session = harness.open().await;

    harness.remote.deliver(&audio_message(&[0u8; 200])).unwrap();
    let state = harness.state.clone();
    wait_until(move || state.is_speaking()).await;
    assert_eq!(harness.state.read().frames_received, 1);

    // 100 samples at 24 kHz fit in one block
    harness.render(480);
    let state = harness.state.clone();
    wait_until(move || !state.is_speaking()).await;
    assert!(harness.state.is_connected());
}

#[tokio::test]
async fn test_odd_length_frame_is_dropped() {
    let harness = Harness::new();
    let _session = harness.open().await;

    harness.remote.deliver(&audio_message(&[1u8, 2, 3])).unwrap();
    harness
        .remote
        .deliver(&json!({"serverContent": {"modelTurn": {"parts": [{"text": "still here"}]}}}).to_string())
        .unwrap();

    let events = harness.events.clone();
    let mut transcript = None;
    for _ in 0..200 {
        if let Ok(LiveEvent::Transcript(text)) = events.try_recv() {
            transcript = Some(text);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(transcript.as_deref(), Some("still here"));
    assert!(!harness.state.is_speaking());
    assert!(harness.state.is_connected());
    assert_eq!(harness.state.read().frames_received, 0);
}

#[tokio::test]
async fn test_disconnect_clears_state_and_closes_link() {
    let mut harness = Harness::new();
    let session = harness.open().await;

    harness.remote.deliver(&audio_message(&[0u8; 4800])).unwrap();
    let state = harness.state.clone();
    wait_until(move || state.is_speaking()).await;

    session.disconnect().await;

    assert!(!harness.state.is_connected());
    assert!(!harness.state.is_speaking());
    assert_eq!(harness.probe().captures_open, 0);
    assert_eq!(harness.probe().playbacks_open, 0);
    assert!(harness.events().contains(&LiveEvent::Disconnected));

    let mut closed = false;
    while let Some(outbound) = harness.remote.try_next_sent() {
        closed |= outbound == Outbound::Close;
    }
    assert!(closed);
}

#[tokio::test]
async fn test_remote_close_tears_down() {
    let harness = Harness::new();
    let session = harness.open().await;

    harness.remote.close(Some("bye"));
    wait_until(|| session.is_finished()).await;

    assert!(!harness.state.is_connected());
    assert_eq!(harness.probe().captures_open, 0);
    assert!(harness
        .events()
        .contains(&LiveEvent::Closed(Some("bye".to_string()))));
}

#[tokio::test]
async fn test_transport_error_is_terminal() {
    let harness = Harness::new();
    let session = harness.open().await;

    harness.remote.fail("socket reset");
    wait_until(|| session.is_finished()).await;

    let snapshot = harness.state.snapshot();
    assert!(!snapshot.connected);
    assert!(!snapshot.speaking);
    assert_eq!(snapshot.last_error.as_deref(), Some("socket reset"));
    assert!(harness
        .events()
        .contains(&LiveEvent::TransportError("socket reset".to_string())));
}

#[tokio::test]
async fn test_close_before_setup_is_a_connect_failure() {
    let harness = Harness::new();
    let session = harness.connect().await.unwrap();

    harness.remote.close(Some("API key not valid"));
    wait_until(|| session.is_finished()).await;

    let snapshot = harness.state.snapshot();
    assert!(!snapshot.connected);
    assert!(!snapshot.connecting);
    assert_eq!(
        snapshot.last_error,
        Some(AdArchitectError::ConnectionFailed(String::new()).user_message())
    );
    assert_eq!(harness.probe().captures_open, 0);
    assert_eq!(harness.probe().playbacks_open, 0);

    let events = harness.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, LiveEvent::ConnectFailed(m) if m.contains("API key not valid"))));
    assert!(!events.iter().any(|e| matches!(e, LiveEvent::Closed(_))));
}

#[tokio::test]
async fn test_lost_microphone_ends_session() {
    let harness = Harness::new();
    let session = harness.open().await;

    // The device drops its sender when the input stream fails
    harness.probe().capture_tx.take();
    wait_until(|| session.is_finished()).await;

    let snapshot = harness.state.snapshot();
    assert!(!snapshot.connected);
    assert!(snapshot.last_error.is_some());
    assert_eq!(harness.probe().captures_open, 0);
    assert!(harness
        .events()
        .iter()
        .any(|e| matches!(e, LiveEvent::TransportError(m) if m.contains("Microphone"))));
}

#[tokio::test]
async fn test_controller_refuses_second_session() {
    let harness = Harness::new();
    let mut controller = LiveController::new(
        LiveConfig::default(),
        Arc::new(harness.backend.clone()),
        Arc::new(harness.connector),
        harness.events_tx.clone(),
    );

    controller.connect().await.unwrap();
    assert!(controller.is_active());

    let err = controller.connect().await.err().unwrap();
    assert!(matches!(err, AdArchitectError::AlreadyConnected));
    assert_eq!(harness.backend.probe.lock().captures_open, 1);

    controller.disconnect().await.unwrap();
    assert!(!controller.is_active());
    assert!(!controller.state().is_connected());
    assert!(matches!(
        controller.disconnect().await,
        Err(AdArchitectError::NotConnected)
    ));
}
