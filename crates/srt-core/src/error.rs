//! Core error types for SRT connections

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for SRT connection management
#[derive(Error, Debug)]
pub enum SrtError {
    /// Malformed or non-SRT address, rejected before any socket is created
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connection error raised by a socket collaborator
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SrtError {
    /// Whether this error rejected the caller's input rather than the network
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SrtError::InvalidArgument(_))
    }

    /// Whether a socket failed to establish its connection
    pub fn is_connection_failed(&self) -> bool {
        matches!(self, SrtError::Connection(ConnectionError::Failed(_)))
    }
}

/// Errors surfaced by a socket collaborator while connecting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The handshake did not complete
    #[error("Connection failed: {0}")]
    Failed(String),

    /// The peer rejected the handshake
    #[error("Connection rejected: {0}")]
    Rejected(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let invalid = SrtError::InvalidArgument("missing port".into());
        assert!(invalid.is_invalid_argument());
        assert!(!invalid.is_connection_failed());

        let failed: SrtError = ConnectionError::Failed("timeout".into()).into();
        assert!(failed.is_connection_failed());
        assert!(!failed.is_invalid_argument());

        let rejected: SrtError = ConnectionError::Rejected("peer".into()).into();
        assert!(!rejected.is_connection_failed());
    }

    #[test]
    fn test_error_display() {
        let err: SrtError = ConnectionError::Failed("handshake timed out".into()).into();
        assert_eq!(
            err.to_string(),
            "Connection error: Connection failed: handshake timed out"
        );
    }
}
