//! Crate-level error type
//!
//! Startup and server plumbing errors. Failures inside a single session's
//! negotiation use [`crate::signaling::SignalingError`] and stay local to
//! that session; this type covers the process-fatal paths (configuration,
//! socket binding).

use crate::capture::CaptureError;
use crate::signaling::SignalingError;

/// Convenience result alias for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for server startup and plumbing
#[derive(Debug)]
pub enum Error {
    /// I/O error (socket bind, accept)
    Io(std::io::Error),
    /// Configuration could not be loaded or deserialized
    Config(config::ConfigError),
    /// Invalid configuration value
    InvalidConfig(String),
    /// Capture pipeline error
    Capture(CaptureError),
    /// Signaling error
    Signaling(SignalingError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Config(e) => write!(f, "configuration error: {}", e),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::Capture(e) => write!(f, "capture error: {}", e),
            Error::Signaling(e) => write!(f, "signaling error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Capture(e) => Some(e),
            Error::Signaling(e) => Some(e),
            Error::InvalidConfig(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CaptureError> for Error {
    fn from(e: CaptureError) -> Self {
        Error::Capture(e)
    }
}

impl From<SignalingError> for Error {
    fn from(e: SignalingError) -> Self {
        Error::Signaling(e)
    }
}
