//! Relay implementation

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use webrtc::api::media_engine::MIME_TYPE_H264;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use super::subscription::{forward_frames, Subscription};
use crate::capture::{CameraSource, CaptureError};

/// Fans the shared camera stream out to independent subscribers
///
/// Holds a reference to the camera but does not control its lifetime; at
/// most one relay exists per source, created alongside it.
pub struct StreamRelay {
    source: Arc<CameraSource>,
    subscribers: Arc<AtomicU32>,
    next_subscriber_id: AtomicU64,
}

impl StreamRelay {
    /// Create the relay for a camera source
    pub fn new(source: Arc<CameraSource>) -> Self {
        Self {
            source,
            subscribers: Arc::new(AtomicU32::new(0)),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to the camera stream
    ///
    /// Initializes the camera on first use, then returns an owned
    /// subscription whose track delivers every frame produced after this
    /// call. The subscription must be released exactly once; ownership makes
    /// a second release unrepresentable.
    pub async fn subscribe(&self) -> Result<Subscription, CaptureError> {
        self.source.initialize().await?;
        let stream = self
            .source
            .stream()
            .await
            .ok_or(CaptureError::NotInitialized)?;

        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let rx = stream.subscribe();

        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_H264.to_owned(),
                clock_rate: 90000,
                sdp_fmtp_line:
                    "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f"
                        .to_owned(),
                ..Default::default()
            },
            "video".to_owned(),
            format!("camcast-{}", id),
        ));

        let forward = tokio::spawn(forward_frames(rx, Arc::clone(&track), id));

        let count = self.subscribers.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(subscriber_id = id, subscribers = count, "Subscriber added");

        Ok(Subscription::new(
            id,
            track,
            forward,
            Arc::clone(&self.subscribers),
        ))
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> u32 {
        self.subscribers.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureParams, TestPatternBackend};

    fn test_relay(backend: TestPatternBackend) -> StreamRelay {
        let params = CaptureParams::new("/dev/video0", 30, 64, 48);
        let source = Arc::new(CameraSource::new(params, Box::new(backend)));
        StreamRelay::new(source)
    }

    #[tokio::test]
    async fn test_subscribe_initializes_camera_once() {
        let backend = TestPatternBackend::new();
        let relay = test_relay(backend.clone());

        let sub_a = relay.subscribe().await.unwrap();
        let sub_b = relay.subscribe().await.unwrap();

        assert_eq!(backend.open_count(), 1);
        assert_eq!(relay.subscriber_count(), 2);
        assert_ne!(sub_a.id(), sub_b.id());

        sub_a.release();
        sub_b.release();
        assert_eq!(relay.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_release_is_independent() {
        let relay = test_relay(TestPatternBackend::new());

        let sub_a = relay.subscribe().await.unwrap();
        let sub_b = relay.subscribe().await.unwrap();

        sub_a.release();

        // Remaining subscriber is untouched
        assert_eq!(relay.subscriber_count(), 1);
        sub_b.release();
    }
}
