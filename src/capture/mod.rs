//! Camera capture pipeline
//!
//! One physical camera, opened exactly once per process, feeding a single
//! shared stream of encoded video frames.
//!
//! # Architecture
//!
//! ```text
//!   CaptureBackend (V4L2 / test pattern)
//!         │ raw RGB frames (blocking reads, dedicated thread)
//!         ▼
//!   H264Encoder (openh264)
//!         │ encoded samples
//!         ▼
//!   broadcast::Sender<VideoFrame>  ◄── CameraSource (initialize-once guard)
//!         │
//!         └──► one Receiver per relay subscription
//! ```
//!
//! # Zero-Copy Design
//!
//! `VideoFrame` carries its payload as `bytes::Bytes`, so the broadcast
//! channel clones frame metadata per subscriber while the encoded data is
//! only reference-counted, never copied.

pub mod backend;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod params;
pub mod source;

pub use backend::{CaptureBackend, FrameReader, RawFrame, TestPatternBackend, V4l2Backend};
pub use encoder::{EncodedFrame, H264Encoder};
pub use error::CaptureError;
pub use frame::VideoFrame;
pub use params::CaptureParams;
pub use source::{CameraSource, FrameStream};
