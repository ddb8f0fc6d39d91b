//! CameraSource: lazy, initialize-once access to the physical camera
//!
//! The camera is opened exactly once per process, on first use. A dedicated
//! capture thread reads raw frames from the backend, encodes them, and fans
//! them out through a broadcast channel. There is no teardown path: the
//! device handle lives until process exit.

use std::sync::Mutex as StdMutex;

use bytes::Bytes;
use tokio::sync::{broadcast, Mutex};

use super::backend::{CaptureBackend, FrameReader};
use super::encoder::H264Encoder;
use super::error::CaptureError;
use super::frame::VideoFrame;
use super::params::CaptureParams;

/// Broadcast capacity per subscriber
///
/// A lagging subscriber skips to the most recent frames instead of stalling
/// the channel; at 30 fps this holds roughly two seconds of video.
const BROADCAST_CAPACITY: usize = 64;

/// Handle on the live, shared frame stream
#[derive(Debug, Clone)]
pub struct FrameStream {
    tx: broadcast::Sender<VideoFrame>,
}

impl FrameStream {
    /// Attach a new independent receiver
    ///
    /// The receiver only observes frames produced after this call; there is
    /// no replay of earlier frames.
    pub fn subscribe(&self) -> broadcast::Receiver<VideoFrame> {
        self.tx.subscribe()
    }

    /// Number of currently attached receivers
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// The single shared camera
///
/// `initialize` is idempotent and mutually exclusive across first-time
/// concurrent callers: the init lock serializes them, the first opens the
/// device, the rest observe the already-initialized state.
pub struct CameraSource {
    params: CaptureParams,
    backend: StdMutex<Box<dyn CaptureBackend>>,
    stream: Mutex<Option<FrameStream>>,
}

impl CameraSource {
    /// Create an uninitialized camera source
    ///
    /// No device access happens here; the device is opened lazily by the
    /// first `initialize` call.
    pub fn new(params: CaptureParams, backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            params,
            backend: StdMutex::new(backend),
            stream: Mutex::new(None),
        }
    }

    /// Capture parameters this source was created with
    pub fn params(&self) -> &CaptureParams {
        &self.params
    }

    /// Open the device and start the capture pump, exactly once
    ///
    /// Subsequent calls are no-ops. Returns `DeviceUnavailable` when the
    /// device path cannot be opened; a failed attempt leaves the source
    /// uninitialized so a later call can retry.
    pub async fn initialize(&self) -> Result<(), CaptureError> {
        let mut guard = self.stream.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        self.params.validate()?;

        let reader = {
            let mut backend = self
                .backend
                .lock()
                .map_err(|_| CaptureError::DeviceUnavailable("backend lock poisoned".into()))?;
            backend.open(&self.params)?
        };

        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let pump_tx = tx.clone();
        let params = self.params.clone();

        std::thread::Builder::new()
            .name("camcast-capture".into())
            .spawn(move || pump_frames(reader, params, pump_tx))
            .map_err(|e| CaptureError::DeviceUnavailable(format!("capture thread: {}", e)))?;

        tracing::info!(
            device = %self.params.device_path,
            frame_rate = self.params.frame_rate,
            width = self.params.width,
            height = self.params.height,
            "Camera source initialized"
        );

        *guard = Some(FrameStream { tx });
        Ok(())
    }

    /// Get the live frame stream, or `None` if not yet initialized
    pub async fn stream(&self) -> Option<FrameStream> {
        self.stream.lock().await.clone()
    }
}

/// Capture pump: read raw frames, encode, broadcast
///
/// Runs on its own thread for the process lifetime. The encoder is created
/// from the first frame's actual dimensions, which may differ from the
/// requested resolution on hardware that snaps to its native formats.
fn pump_frames(
    mut reader: Box<dyn FrameReader>,
    params: CaptureParams,
    tx: broadcast::Sender<VideoFrame>,
) {
    let frame_duration = params.frame_duration();
    let mut encoder: Option<H264Encoder> = None;

    loop {
        let raw = match reader.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(device = %params.device_path, error = %e, "Capture read failed, stopping pump");
                return;
            }
        };

        if encoder.is_none() {
            match H264Encoder::new(raw.width, raw.height) {
                Ok(enc) => {
                    tracing::debug!(width = raw.width, height = raw.height, "Encoder created");
                    encoder = Some(enc);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Encoder creation failed, stopping pump");
                    return;
                }
            }
        }
        let Some(enc) = encoder.as_mut() else {
            return;
        };

        match enc.encode_rgb(&raw.data) {
            Ok(encoded) if encoded.data.is_empty() => {}
            Ok(encoded) => {
                let frame =
                    VideoFrame::new(Bytes::from(encoded.data), frame_duration, encoded.is_keyframe);
                // send() errs only when no receiver is attached; frames
                // produced with no subscribers are simply dropped
                let _ = tx.send(frame);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Frame encode failed, skipping frame");
            }
        }
    }
}
