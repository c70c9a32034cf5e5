//! Live director controller
//!
//! [`LiveController`] owns at most one [`LiveSession`] and serializes
//! connect/disconnect. [`LiveAgent`] runs a controller on its own thread
//! with a tokio runtime so the UI can drive it through channels.

use crate::audio::device::AudioBackend;
use crate::integration::config::LiveConfig;
use crate::live::session::{emit, LiveEvent, LiveSession};
use crate::live::state::SharedSessionState;
use crate::live::transport::LiveConnector;
use crate::utils::channels::WorkerChannels;
use crate::{AdArchitectError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

/// Async controller holding the active session
pub struct LiveController {
    config: LiveConfig,
    backend: Arc<dyn AudioBackend>,
    connector: Arc<dyn LiveConnector>,
    state: SharedSessionState,
    events: Sender<LiveEvent>,
    session: Option<LiveSession>,
}

impl LiveController {
    pub fn new(
        config: LiveConfig,
        backend: Arc<dyn AudioBackend>,
        connector: Arc<dyn LiveConnector>,
        events: Sender<LiveEvent>,
    ) -> Self {
        Self {
            config,
            backend,
            connector,
            state: SharedSessionState::new(),
            events,
            session: None,
        }
    }

    pub fn state(&self) -> SharedSessionState {
        self.state.clone()
    }

    /// True while a session is open or being opened
    pub fn is_active(&self) -> bool {
        self.session.as_ref().map(|s| !s.is_finished()).unwrap_or(false)
    }

    /// Open a new session, refusing if one is still running
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_active() {
            warn!("Connect requested while a live session is active");
            let err = AdArchitectError::AlreadyConnected;
            emit(&self.events, LiveEvent::ConnectFailed(err.to_string()));
            return Err(err);
        }

        // Reap a session that ended on its own
        if let Some(finished) = self.session.take() {
            finished.disconnect().await;
        }

        let session = LiveSession::connect(
            &self.config,
            self.backend.as_ref(),
            self.connector.as_ref(),
            self.state.clone(),
            self.events.clone(),
        )
        .await?;

        self.session = Some(session);
        Ok(())
    }

    /// End the current session.
    ///
    /// The state is left disconnected even when there was nothing to end.
    pub async fn disconnect(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                session.disconnect().await;
                Ok(())
            }
            None => {
                self.state.update(|s| s.reset());
                Err(AdArchitectError::NotConnected)
            }
        }
    }
}

/// Commands accepted by the live agent worker
#[derive(Debug, Clone, PartialEq)]
pub enum LiveCommand {
    Connect,
    Disconnect,
    Shutdown,
}

/// UI-facing handle to a controller running on a worker thread
pub struct LiveAgent {
    command_tx: Sender<LiveCommand>,
    event_rx: Receiver<LiveEvent>,
    state: SharedSessionState,
    worker: Option<JoinHandle<()>>,
}

impl LiveAgent {
    /// Spawn the worker thread and its runtime
    pub fn start(
        config: LiveConfig,
        backend: Arc<dyn AudioBackend>,
        connector: Arc<dyn LiveConnector>,
    ) -> Result<Self> {
        let WorkerChannels {
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        } = WorkerChannels::<LiveCommand, LiveEvent>::new(16, 256);

        let controller = LiveController::new(config, backend, connector, event_tx);
        let state = controller.state();

        let worker = thread::Builder::new()
            .name("adarchitect-live".to_string())
            .spawn(move || run_worker(controller, command_rx))
            .map_err(|e| AdArchitectError::ChannelError(format!("Failed to spawn live worker: {}", e)))?;

        Ok(Self {
            command_tx,
            event_rx,
            state,
            worker: Some(worker),
        })
    }

    /// Send a command to the worker
    pub fn send_command(&self, cmd: LiveCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| AdArchitectError::ChannelError(format!("Failed to send command: {}", e)))
    }

    pub fn connect(&self) -> Result<()> {
        self.send_command(LiveCommand::Connect)
    }

    pub fn disconnect(&self) -> Result<()> {
        self.send_command(LiveCommand::Disconnect)
    }

    /// Try to receive an event from the worker
    pub fn try_recv_event(&self) -> Option<LiveEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Get the event receiver for blocking consumers
    pub fn event_receiver(&self) -> Receiver<LiveEvent> {
        self.event_rx.clone()
    }

    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }
}

impl Drop for LiveAgent {
    fn drop(&mut self) {
        let _ = self.command_tx.send(LiveCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(mut controller: LiveController, command_rx: Receiver<LiveCommand>) {
    info!("Live agent worker starting");

    let runtime = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            emit(
                &controller.events,
                LiveEvent::ConnectFailed(format!("Runtime creation failed: {}", e)),
            );
            return;
        }
    };

    loop {
        match command_rx.recv() {
            Ok(LiveCommand::Connect) => {
                if let Err(e) = runtime.block_on(controller.connect()) {
                    debug!("Connect rejected: {}", e);
                }
            }
            Ok(LiveCommand::Disconnect) => {
                if let Err(e) = runtime.block_on(controller.disconnect()) {
                    debug!("Disconnect: {}", e);
                }
            }
            Ok(LiveCommand::Shutdown) => {
                info!("Live agent worker shutting down");
                let _ = runtime.block_on(controller.disconnect());
                break;
            }
            Err(e) => {
                error!("Command channel error: {}", e);
                let _ = runtime.block_on(controller.disconnect());
                break;
            }
        }
    }

    info!("Live agent worker stopped");
}
