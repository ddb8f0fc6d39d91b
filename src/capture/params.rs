//! Capture parameters
//!
//! Device path plus frame rate and resolution, validated before the device
//! is ever touched.

use std::time::Duration;

use super::error::CaptureError;

/// Parameters for opening the capture device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureParams {
    /// Device path (e.g. "/dev/video0")
    pub device_path: String,

    /// Requested frame rate in frames per second
    pub frame_rate: u32,

    /// Requested frame width in pixels
    pub width: u32,

    /// Requested frame height in pixels
    pub height: u32,
}

impl CaptureParams {
    /// Create parameters for the given device path with a frame rate and resolution
    pub fn new(device_path: impl Into<String>, frame_rate: u32, width: u32, height: u32) -> Self {
        Self {
            device_path: device_path.into(),
            frame_rate,
            width,
            height,
        }
    }

    /// Validate the parameters
    ///
    /// Frame rate and both resolution dimensions must be positive and the
    /// device path non-empty. Runs before any device access.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.device_path.is_empty() {
            return Err(CaptureError::InvalidParams(
                "device path must not be empty".into(),
            ));
        }
        if self.frame_rate == 0 {
            return Err(CaptureError::InvalidParams(
                "frame rate must be positive".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::InvalidParams(format!(
                "resolution must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Nominal duration of one frame at the requested rate
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate as f64)
    }
}
