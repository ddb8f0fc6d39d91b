//! Server configuration
//!
//! Loaded from `settings.yaml` at startup. A missing file or missing key is
//! process-fatal: nothing is served with a half-configured camera.

use std::net::SocketAddr;

use serde::Deserialize;

use crate::capture::CaptureParams;
use crate::error::Error;

/// Camera section of the settings file
#[derive(Debug, Clone, Deserialize)]
pub struct CameraSettings {
    /// Capture device path (e.g. "/dev/video0")
    pub device_path: String,

    /// Capture frame rate in frames per second
    pub frame_rate: u32,

    /// Capture width in pixels
    pub width: u32,

    /// Capture height in pixels
    pub height: u32,
}

/// Server settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Enable debug-level logging
    #[serde(default)]
    pub verbose: bool,

    /// Streaming time limit shown by the browser client, in seconds
    pub max_connection_time_secs: u64,

    /// Restrict outbound video to this MIME type (e.g. "video/H264");
    /// unset leaves the engine's full codec set negotiable
    #[serde(default)]
    pub preferred_codec: Option<String>,

    /// Camera configuration
    pub camera: CameraSettings,
}

impl Settings {
    /// Load settings from the given file
    ///
    /// Camera parameters are validated here, before the capture pipeline is
    /// ever constructed.
    pub fn load(path: &str) -> Result<Self, Error> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?
            .try_deserialize()?;

        settings.capture_params().validate()?;
        Ok(settings)
    }

    /// The socket address to bind the HTTP server to
    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("invalid host/port: {}", e)))
    }

    /// Capture parameters for the camera section
    pub fn capture_params(&self) -> CaptureParams {
        CaptureParams::new(
            self.camera.device_path.clone(),
            self.camera.frame_rate,
            self.camera.width,
            self.camera.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
host: 127.0.0.1
port: 8443
verbose: true
max_connection_time_secs: 60
preferred_codec: video/H264
camera:
  device_path: /dev/video0
  frame_rate: 30
  width: 1280
  height: 720
"#;

    fn parse(yaml: &str) -> Result<Settings, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_parse_settings() {
        let settings = parse(YAML).unwrap();

        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8443);
        assert!(settings.verbose);
        assert_eq!(settings.max_connection_time_secs, 60);
        assert_eq!(settings.preferred_codec.as_deref(), Some("video/H264"));
        assert_eq!(settings.camera.device_path, "/dev/video0");
        assert_eq!(settings.camera.frame_rate, 30);
    }

    #[test]
    fn test_bind_addr() {
        let settings = parse(YAML).unwrap();
        let addr = settings.bind_addr().unwrap();
        assert_eq!(addr.port(), 8443);
    }

    #[test]
    fn test_capture_params_roundtrip() {
        let settings = parse(YAML).unwrap();
        let params = settings.capture_params();

        assert_eq!(params.device_path, "/dev/video0");
        assert_eq!(params.frame_rate, 30);
        assert_eq!(params.width, 1280);
        assert_eq!(params.height, 720);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_missing_camera_section_fails() {
        let yaml = "host: 0.0.0.0\nport: 8443\nmax_connection_time_secs: 60\n";
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let yaml = r#"
host: 0.0.0.0
port: 8443
max_connection_time_secs: 60
camera:
  device_path: /dev/video0
  frame_rate: 30
  width: 640
  height: 480
"#;
        let settings = parse(yaml).unwrap();
        assert!(!settings.verbose);
        assert!(settings.preferred_codec.is_none());
    }
}
