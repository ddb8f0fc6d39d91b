//! camcast: WebRTC camera streaming server
//!
//! Streams one physical USB camera to any number of browser viewers. The
//! camera is opened exactly once per process; every viewer gets an
//! independent delivery path off a shared broadcast stream.
//!
//! # Architecture
//!
//! ```text
//!                    CameraSource (one device, opened lazily, once)
//!                          │ encoded frames
//!                          ▼
//!                     StreamRelay ──► broadcast::Sender<VideoFrame>
//!                          │
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!    [Subscription]  [Subscription]  [Subscription]
//!     write_sample    write_sample    write_sample
//!          │               │               │
//!       Session         Session         Session ──► SessionRegistry
//!          ▲               ▲               ▲
//!          └──────── SignalingService ─────┘
//!                          ▲
//!                     POST /offer
//! ```
//!
//! Sessions register *before* negotiation completes, so a concurrent
//! shutdown always sees them; teardown (failure-observed or bulk shutdown)
//! is idempotent and releases each relay subscription exactly once.

pub mod capture;
pub mod error;
pub mod relay;
pub mod server;
pub mod session;
pub mod signaling;

pub use capture::{CameraSource, CaptureParams};
pub use error::{Error, Result};
pub use relay::StreamRelay;
pub use server::Settings;
pub use session::SessionRegistry;
pub use signaling::SignalingService;
