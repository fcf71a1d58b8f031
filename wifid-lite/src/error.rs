/// Error types for the wifid-lite library
use thiserror::Error;

use crate::types::P2pStatus;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, WifiDError>;

/// Errors that can occur in wifid-lite operations
#[derive(Debug, Error)]
pub enum WifiDError {
    /// Operation called before `initialize` or after `dispose`
    #[error(
        "WifiDLite not initialized. Initialize the session before using it, \
         and reinitialize it if dispose was called earlier"
    )]
    NotInitialized,

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Platform P2P action failed
    #[error("Platform action failed: {0}")]
    Platform(P2pStatus),

    /// The session dispatcher is no longer running
    #[error("Session closed")]
    SessionClosed,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for WifiDError {
    fn from(err: serde_json::Error) -> Self {
        WifiDError::Serialization(err.to_string())
    }
}
