//! Subscriber handle and its forwarding task

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use webrtc::media::Sample;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use crate::capture::VideoFrame;

/// An owned subscription to the camera stream
///
/// Wraps the outbound track and the forwarding task pumping frames into it.
/// Dropping without `release` leaks the forwarding task until the channel
/// closes; teardown paths keep the handle in an `Option` and `take()` it.
pub struct Subscription {
    id: u64,
    track: Arc<TrackLocalStaticSample>,
    forward: tokio::task::JoinHandle<()>,
    subscribers: Arc<AtomicU32>,
}

impl Subscription {
    pub(super) fn new(
        id: u64,
        track: Arc<TrackLocalStaticSample>,
        forward: tokio::task::JoinHandle<()>,
        subscribers: Arc<AtomicU32>,
    ) -> Self {
        Self {
            id,
            track,
            forward,
            subscribers,
        }
    }

    /// Subscriber id, unique per relay
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The outbound track fed by this subscription
    pub fn track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    /// Release the subscription
    ///
    /// Consumes the handle: stops the forwarding task and drops this
    /// subscriber's receiver. Safe to call at most once by construction.
    pub fn release(self) {
        self.forward.abort();
        let prev = self.subscribers.fetch_sub(1, Ordering::Relaxed);
        tracing::debug!(
            subscriber_id = self.id,
            subscribers = prev.saturating_sub(1),
            "Subscriber removed"
        );
    }
}

/// Pump frames from the broadcast channel into the outbound track
///
/// Independent per subscriber: a lagged receiver logs and skips, it never
/// back-pressures the capture pump or other subscribers.
pub(super) async fn forward_frames(
    mut rx: broadcast::Receiver<VideoFrame>,
    track: Arc<TrackLocalStaticSample>,
    subscriber_id: u64,
) {
    loop {
        match rx.recv().await {
            Ok(frame) => {
                let sample = Sample {
                    data: frame.data.clone(),
                    duration: frame.duration,
                    ..Default::default()
                };
                if let Err(e) = track.write_sample(&sample).await {
                    tracing::debug!(
                        subscriber_id,
                        error = %e,
                        "Track write failed, stopping forward task"
                    );
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(subscriber_id, skipped, "Subscriber lagged, frames skipped");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!(subscriber_id, "Frame stream closed");
                break;
            }
        }
    }
}
