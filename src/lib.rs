pub mod audio;
pub mod integration;
pub mod live;
pub mod studio;
pub mod ui;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AdArchitectError {
    #[error("Microphone unavailable: {0}")]
    PermissionDenied(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("A live session is already active")]
    AlreadyConnected,

    #[error("No live session is active")]
    NotConnected,

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for AdArchitectError {
    fn from(e: std::io::Error) -> Self {
        AdArchitectError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for AdArchitectError {
    fn from(e: serde_json::Error) -> Self {
        AdArchitectError::ProtocolError(e.to_string())
    }
}

impl AdArchitectError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user has to grant access or plug in a device
            AdArchitectError::PermissionDenied(_) => false,
            // Reconnecting is a user action, but it usually succeeds
            AdArchitectError::ConnectionFailed(_) => true,
            AdArchitectError::TransportError(_) => true,
            AdArchitectError::AlreadyConnected => true,
            AdArchitectError::NotConnected => true,
            AdArchitectError::AudioDeviceError(_) => false,
            // A single malformed frame does not poison the session
            AdArchitectError::ProtocolError(_) => true,
            AdArchitectError::GenerationError(_) => true,
            AdArchitectError::ConfigError(_) => false,
            AdArchitectError::ChannelError(_) => false,
            AdArchitectError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            AdArchitectError::PermissionDenied(_) => {
                "Microphone access was denied or no microphone is available.".to_string()
            }
            AdArchitectError::ConnectionFailed(_) => {
                "Could not reach the live model. Please try again.".to_string()
            }
            AdArchitectError::TransportError(_) => {
                "The live session dropped. Reconnect to continue.".to_string()
            }
            AdArchitectError::AlreadyConnected => {
                "A live session is already running.".to_string()
            }
            AdArchitectError::NotConnected => "No live session is running.".to_string(),
            AdArchitectError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            AdArchitectError::ProtocolError(_) => {
                "Received an unexpected message from the model.".to_string()
            }
            AdArchitectError::GenerationError(_) => {
                "Content generation failed. Please try again.".to_string()
            }
            AdArchitectError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            AdArchitectError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            AdArchitectError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdArchitectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_failures_are_distinct() {
        let denied = AdArchitectError::PermissionDenied("no device".into());
        let failed = AdArchitectError::ConnectionFailed("refused".into());

        assert!(!denied.is_recoverable());
        assert!(failed.is_recoverable());
        assert!(denied.to_string().contains("no device"));
        assert!(failed.to_string().contains("refused"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err: AdArchitectError = io.into();
        assert!(matches!(err, AdArchitectError::IOError(_)));
        assert_eq!(err.user_message(), "File system error occurred.");
    }
}
