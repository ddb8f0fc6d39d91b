//! Signaling service
//!
//! Accepts offers, drives negotiation against the transport engine, and
//! owns session registration/deregistration. Offers are handled
//! concurrently and independently; the registry is the only shared mutable
//! state between them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{APIBuilder, API};
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;

use super::codec::restrict_codec;
use super::error::SignalingError;
use super::payload::{AnswerPayload, OfferPayload};
use crate::relay::StreamRelay;
use crate::session::{spawn_state_monitor, Session, SessionRegistry};

/// Capacity of the per-session state-change channel
const STATE_EVENT_CAPACITY: usize = 8;

/// Build the transport-engine API: default codecs + default interceptors
pub fn build_api() -> Result<API, SignalingError> {
    let mut media_engine = MediaEngine::default();
    media_engine.register_default_codecs()?;

    let mut registry = Registry::new();
    registry = register_default_interceptors(registry, &mut media_engine)?;

    Ok(APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build())
}

/// Offer/answer negotiation service
pub struct SignalingService {
    api: API,
    registry: Arc<SessionRegistry>,
    relay: Arc<StreamRelay>,
    preferred_codec: Option<String>,
    next_session_id: AtomicU64,
}

impl SignalingService {
    /// Create the service
    ///
    /// `preferred_codec` restricts outbound video to a single MIME type
    /// (e.g. "video/H264"); `None` leaves the engine's full capability set
    /// negotiable.
    pub fn new(
        relay: Arc<StreamRelay>,
        registry: Arc<SessionRegistry>,
        preferred_codec: Option<String>,
    ) -> Result<Self, SignalingError> {
        Ok(Self {
            api: build_api()?,
            registry,
            relay,
            preferred_codec,
            next_session_id: AtomicU64::new(1),
        })
    }

    /// The session registry this service registers into
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Handle one incoming offer, producing the local answer
    ///
    /// The session is registered *before* negotiation completes so that a
    /// concurrent shutdown is guaranteed to see and close it. Any failure
    /// after registration deregisters the session and releases its relay
    /// subscription before the error is surfaced.
    pub async fn handle_offer(
        &self,
        payload: OfferPayload,
    ) -> Result<AnswerPayload, SignalingError> {
        payload.validate()?;
        let offer = RTCSessionDescription::offer(payload.sdp)
            .map_err(|e| SignalingError::InvalidOffer(e.to_string()))?;

        let pc = Arc::new(
            self.api
                .new_peer_connection(RTCConfiguration::default())
                .await?,
        );

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(Session::new(id, pc));
        self.registry.insert(Arc::clone(&session)).await;

        tracing::info!(session_id = id, "Offer received");

        match self.negotiate(&session, offer).await {
            Ok(answer) => {
                tracing::info!(session_id = id, "Answer generated");
                Ok(answer)
            }
            Err(e) => {
                tracing::warn!(session_id = id, error = %e, "Negotiation failed, tearing session down");
                session.close().await;
                self.registry.remove(id).await;
                Err(e)
            }
        }
    }

    async fn negotiate(
        &self,
        session: &Arc<Session>,
        offer: RTCSessionDescription,
    ) -> Result<AnswerPayload, SignalingError> {
        let pc = session.peer_connection();

        // Outbound video: one relay subscription per session. This lazily
        // opens the camera on the first session.
        let subscription = self.relay.subscribe().await?;
        let track = subscription.track();
        session.attach_subscription(subscription).await;

        let sender = pc
            .add_track(track as Arc<dyn TrackLocal + Send + Sync>)
            .await?;

        if let Some(mime_type) = &self.preferred_codec {
            restrict_codec(pc.as_ref(), &sender, mime_type).await?;
        }

        // State changes flow through an explicit channel into a per-session
        // monitor, subscribed exactly once here at creation time.
        let (state_tx, state_rx) = mpsc::channel(STATE_EVENT_CAPACITY);
        pc.on_peer_connection_state_change(Box::new(move |state| {
            let state_tx = state_tx.clone();
            Box::pin(async move {
                let _ = state_tx.send(state).await;
            })
        }));
        spawn_state_monitor(
            Arc::clone(session),
            Arc::clone(&self.registry),
            state_rx,
        );

        pc.set_remote_description(offer).await?;
        let answer = pc.create_answer(None).await?;

        let mut gather_complete = pc.gathering_complete_promise().await;
        pc.set_local_description(answer).await?;
        let _ = gather_complete.recv().await;

        let local = pc.local_description().await.ok_or_else(|| {
            SignalingError::NegotiationFailed("local description unavailable".into())
        })?;

        Ok(AnswerPayload::from(local))
    }

    /// Close every live session and clear the registry
    ///
    /// Invoked at process shutdown. Safe to call concurrently with in-flight
    /// offers: sessions register before negotiating, so any session visible
    /// in the registry snapshot is closed; one registered after the snapshot
    /// is not guaranteed to be.
    pub async fn shutdown_all(&self) {
        self.registry.shutdown_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CameraSource, CaptureParams, TestPatternBackend};

    fn test_service(preferred_codec: Option<String>) -> SignalingService {
        let params = CaptureParams::new("/dev/video0", 30, 64, 48);
        let source = Arc::new(CameraSource::new(
            params,
            Box::new(TestPatternBackend::new()),
        ));
        let relay = Arc::new(StreamRelay::new(source));
        let registry = Arc::new(SessionRegistry::new());
        SignalingService::new(relay, registry, preferred_codec).unwrap()
    }

    #[tokio::test]
    async fn test_wrong_payload_type_is_invalid_offer() {
        let service = test_service(None);
        let result = service
            .handle_offer(OfferPayload {
                kind: "answer".into(),
                sdp: "v=0\r\n".into(),
            })
            .await;

        assert!(matches!(result, Err(SignalingError::InvalidOffer(_))));
        // No session was created
        assert!(service.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_garbage_sdp_is_invalid_offer() {
        let service = test_service(None);
        let result = service
            .handle_offer(OfferPayload {
                kind: "offer".into(),
                sdp: "not an sdp".into(),
            })
            .await;

        assert!(matches!(result, Err(SignalingError::InvalidOffer(_))));
        assert!(service.registry().is_empty().await);
    }
}
