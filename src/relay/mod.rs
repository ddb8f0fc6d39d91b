//! Stream relay: single-producer / multi-consumer fan-out
//!
//! One [`CameraSource`](crate::capture::CameraSource) feeds any number of
//! independent subscribers, each presented as an outbound WebRTC video
//! track. Subscribers never block each other: every subscription owns its
//! own broadcast receiver, and a lagging receiver skips frames instead of
//! stalling delivery to the rest.

pub mod stream;
pub mod subscription;

pub use stream::StreamRelay;
pub use subscription::Subscription;
