//! HTTP server plumbing
//!
//! Configuration loading and the axum router/serve loop around the
//! signaling core.

pub mod config;
pub mod http;

pub use config::{CameraSettings, Settings};
pub use http::{router, serve, ClientConfig};
