//! Capture error types

/// Error type for capture pipeline operations
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// The capture device could not be opened
    DeviceUnavailable(String),
    /// Capture parameters failed validation
    InvalidParams(String),
    /// The camera has not been initialized yet
    NotInitialized,
    /// Frame encoding failed
    Encode(String),
    /// Reading a frame from the device failed
    Read(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::DeviceUnavailable(msg) => write!(f, "device unavailable: {}", msg),
            CaptureError::InvalidParams(msg) => write!(f, "invalid capture parameters: {}", msg),
            CaptureError::NotInitialized => write!(f, "camera not initialized"),
            CaptureError::Encode(msg) => write!(f, "encode failed: {}", msg),
            CaptureError::Read(msg) => write!(f, "frame read failed: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}
