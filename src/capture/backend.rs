//! Capture device backends
//!
//! The seam between `CameraSource` and actual device access. The production
//! backend opens a V4L2 device through nokhwa; the test-pattern backend
//! generates synthetic frames so the rest of the pipeline can run without
//! hardware.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

use super::error::CaptureError;
use super::params::CaptureParams;

/// A raw RGB24 frame read from a capture device
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Packed RGB24 pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

/// Blocking reader for a stream of raw frames
///
/// Runs on the capture pump thread; `read_frame` may block until the next
/// frame is available.
pub trait FrameReader: Send {
    /// Read the next frame from the device
    fn read_frame(&mut self) -> Result<RawFrame, CaptureError>;
}

/// A capture device that can be opened into a frame reader
pub trait CaptureBackend: Send {
    /// Open the device described by `params`
    ///
    /// Called at most once per successful initialization; an unreachable
    /// device fails with [`CaptureError::DeviceUnavailable`].
    fn open(&mut self, params: &CaptureParams) -> Result<Box<dyn FrameReader>, CaptureError>;
}

/// V4L2 backend using nokhwa
#[derive(Debug, Default)]
pub struct V4l2Backend;

impl V4l2Backend {
    /// Create the default V4L2 backend
    pub fn new() -> Self {
        Self
    }
}

/// Map a device path like "/dev/video0" (or a bare index "0") to a V4L2 index
fn parse_device_index(device_path: &str) -> Result<u32, CaptureError> {
    let digits = device_path
        .strip_prefix("/dev/video")
        .unwrap_or(device_path);

    digits.parse::<u32>().map_err(|_| {
        CaptureError::DeviceUnavailable(format!(
            "unrecognized device path '{}', expected /dev/videoN or a device index",
            device_path
        ))
    })
}

impl CaptureBackend for V4l2Backend {
    fn open(&mut self, params: &CaptureParams) -> Result<Box<dyn FrameReader>, CaptureError> {
        let index = parse_device_index(&params.device_path)?;

        let format = CameraFormat::new(
            Resolution::new(params.width, params.height),
            FrameFormat::MJPEG,
            params.frame_rate,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(CameraIndex::Index(index), requested).map_err(|e| {
            CaptureError::DeviceUnavailable(format!(
                "failed to open {}: {}",
                params.device_path, e
            ))
        })?;

        camera.open_stream().map_err(|e| {
            CaptureError::DeviceUnavailable(format!(
                "failed to start stream on {}: {}",
                params.device_path, e
            ))
        })?;

        let actual = camera.camera_format();
        tracing::info!(
            device = %params.device_path,
            format = ?actual,
            "Camera opened"
        );

        Ok(Box::new(V4l2Reader { camera }))
    }
}

struct V4l2Reader {
    camera: Camera,
}

impl FrameReader for V4l2Reader {
    fn read_frame(&mut self) -> Result<RawFrame, CaptureError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::Read(e.to_string()))?;

        let resolution = buffer.resolution();
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Read(format!("frame decode failed: {}", e)))?;

        Ok(RawFrame {
            data: image.into_raw(),
            width: resolution.width_x,
            height: resolution.height_y,
        })
    }
}

/// Synthetic gradient backend for tests and hardware-free demos
///
/// Produces RGB frames with a gradient that shifts each frame, paced at the
/// requested frame rate. The open counter lets tests assert the
/// exactly-one-device-open property.
#[derive(Debug, Default, Clone)]
pub struct TestPatternBackend {
    opens: Arc<AtomicUsize>,
}

impl TestPatternBackend {
    /// Create a new test-pattern backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `open` has been called on this backend
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }
}

impl CaptureBackend for TestPatternBackend {
    fn open(&mut self, params: &CaptureParams) -> Result<Box<dyn FrameReader>, CaptureError> {
        self.opens.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(TestPatternReader {
            width: params.width,
            height: params.height,
            frame_duration: params.frame_duration(),
            frame_number: 0,
        }))
    }
}

struct TestPatternReader {
    width: u32,
    height: u32,
    frame_duration: Duration,
    frame_number: u64,
}

impl FrameReader for TestPatternReader {
    fn read_frame(&mut self) -> Result<RawFrame, CaptureError> {
        // Pace like a real device delivering frames at the requested rate
        std::thread::sleep(self.frame_duration);

        let frame = synthetic_frame(self.frame_number, self.width, self.height);
        self.frame_number += 1;
        Ok(frame)
    }
}

/// Gradient pattern that changes each frame, exercising temporal encoding
fn synthetic_frame(frame_number: u64, width: u32, height: u32) -> RawFrame {
    let mut data = vec![0u8; (width * height * 3) as usize];

    let base = (frame_number % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = base.wrapping_add((x % 256) as u8);
            data[idx + 1] = base.wrapping_add((y % 256) as u8);
            data[idx + 2] = base.wrapping_add(((x + y) % 256) as u8);
        }
    }

    RawFrame {
        data,
        width,
        height,
    }
}
