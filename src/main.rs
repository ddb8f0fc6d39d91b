//! camcast server binary
//!
//! Loads `settings.yaml`, wires the capture/relay/signaling stack together,
//! and serves until ctrl-c, closing all live sessions on the way out.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use camcast::capture::{CameraSource, V4l2Backend};
use camcast::relay::StreamRelay;
use camcast::server::{serve, ClientConfig, Settings};
use camcast::session::SessionRegistry;
use camcast::signaling::SignalingService;

#[tokio::main]
async fn main() -> camcast::Result<()> {
    let settings = Settings::load("settings.yaml")?;
    init_tracing(settings.verbose);

    let addr = settings.bind_addr()?;

    let source = Arc::new(CameraSource::new(
        settings.capture_params(),
        Box::new(V4l2Backend::new()),
    ));
    let relay = Arc::new(StreamRelay::new(source));
    let registry = Arc::new(SessionRegistry::new());
    let service = Arc::new(SignalingService::new(
        relay,
        registry,
        settings.preferred_codec.clone(),
    )?);

    let client = ClientConfig {
        max_connection_time: settings.max_connection_time_secs,
        video_width: settings.camera.width,
        video_height: settings.camera.height,
    };

    serve(addr, service, client).await
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "camcast=debug"
    } else {
        "camcast=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
