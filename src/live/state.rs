//! Live session state shared with the UI

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Status shown to the user, derived from the session flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    /// Connected and waiting for the model to speak
    Listening,
    /// The model's audio is playing
    Speaking,
}

impl SessionStatus {
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionStatus::Disconnected)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Disconnected => write!(f, "Offline"),
            SessionStatus::Connecting => write!(f, "Connecting"),
            SessionStatus::Listening => write!(f, "Listening"),
            SessionStatus::Speaking => write!(f, "Agent speaking"),
        }
    }
}

/// Flags mutated by the session driver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub connecting: bool,
    pub connected: bool,
    pub speaking: bool,
    /// Scaled RMS of the last capture window
    pub volume: f32,
    pub last_error: Option<String>,
    pub frames_sent: u64,
    pub frames_received: u64,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        if self.connected {
            if self.speaking {
                SessionStatus::Speaking
            } else {
                SessionStatus::Listening
            }
        } else if self.connecting {
            SessionStatus::Connecting
        } else {
            SessionStatus::Disconnected
        }
    }

    /// Back to disconnected, keeping the last error for display
    pub fn reset(&mut self) {
        let last_error = self.last_error.take();
        *self = Self {
            last_error,
            ..Default::default()
        };
    }
}

/// Thread-safe handle to [`SessionState`]
#[derive(Clone, Default)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a read lock on the state
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    /// Mutate the state under the write lock
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Get a copy of the current state (no lock held after return)
    pub fn snapshot(&self) -> SessionState {
        self.inner.read().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.read().status()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.read().connected
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.read().speaking
    }

    pub fn volume(&self) -> f32 {
        self.inner.read().volume
    }
}
