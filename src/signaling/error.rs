//! Signaling error taxonomy
//!
//! Errors during a single session's negotiation are local to that session:
//! they never affect other concurrent sessions or registry consistency.

use crate::capture::CaptureError;

/// Error type for signaling operations
#[derive(Debug, Clone)]
pub enum SignalingError {
    /// Malformed offer payload; no session is created
    InvalidOffer(String),
    /// Remote/local description application or answer generation failed;
    /// the partially-constructed session has been torn down
    NegotiationFailed(String),
    /// The capture device could not be opened for this session's video
    DeviceUnavailable(String),
    /// Codec policy applied to a sender with no transceiver on the
    /// connection; an internal invariant violation
    SenderNotFound,
}

impl std::fmt::Display for SignalingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalingError::InvalidOffer(msg) => write!(f, "invalid offer: {}", msg),
            SignalingError::NegotiationFailed(msg) => write!(f, "negotiation failed: {}", msg),
            SignalingError::DeviceUnavailable(msg) => write!(f, "device unavailable: {}", msg),
            SignalingError::SenderNotFound => {
                write!(f, "sender is not attached to any transceiver")
            }
        }
    }
}

impl std::error::Error for SignalingError {}

impl From<CaptureError> for SignalingError {
    fn from(e: CaptureError) -> Self {
        match e {
            CaptureError::DeviceUnavailable(msg) => SignalingError::DeviceUnavailable(msg),
            other => SignalingError::NegotiationFailed(other.to_string()),
        }
    }
}

impl From<webrtc::Error> for SignalingError {
    fn from(e: webrtc::Error) -> Self {
        SignalingError::NegotiationFailed(e.to_string())
    }
}
