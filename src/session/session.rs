//! One negotiated connection to one client
//!
//! A `Session` wraps the transport-engine connection object, owns one relay
//! subscription, and guarantees idempotent teardown: closing the connection,
//! releasing the subscription, and (via the state monitor) deregistering
//! happen exactly once no matter how often teardown is triggered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use tokio::sync::{mpsc, Mutex};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::RTCPeerConnection;

use super::registry::SessionRegistry;
use super::state::ConnectionPhase;
use crate::relay::Subscription;

/// One negotiated client connection
pub struct Session {
    /// Unique session ID
    id: u64,

    /// Transport-engine connection
    pc: Arc<RTCPeerConnection>,

    /// Current lifecycle phase, advanced by observed state changes
    phase: StdMutex<ConnectionPhase>,

    /// Relay subscription, taken exactly once during teardown
    subscription: Mutex<Option<Subscription>>,

    /// Teardown-once guard
    torn_down: AtomicBool,
}

impl Session {
    /// Create a session around a fresh connection
    pub fn new(id: u64, pc: Arc<RTCPeerConnection>) -> Self {
        Self {
            id,
            pc,
            phase: StdMutex::new(ConnectionPhase::New),
            subscription: Mutex::new(None),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Unique session ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The underlying transport-engine connection
    pub fn peer_connection(&self) -> &Arc<RTCPeerConnection> {
        &self.pc
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.lock().unwrap()
    }

    /// Attach the relay subscription this session owns
    pub async fn attach_subscription(&self, subscription: Subscription) {
        *self.subscription.lock().await = Some(subscription);
    }

    /// Apply an observed engine state change, returning the new phase if any
    fn observe(&self, state: RTCPeerConnectionState) -> Option<ConnectionPhase> {
        let mut phase = self.phase.lock().unwrap();
        let next = phase.observe(state)?;
        *phase = next;
        Some(next)
    }

    /// Tear the session down: close the connection, release the subscription
    ///
    /// Idempotent: only the first caller does the work; concurrent and
    /// repeated calls return immediately. Deregistration is the caller's
    /// half (the state monitor or the registry's bulk shutdown).
    pub async fn close(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Err(e) = self.pc.close().await {
            tracing::warn!(session_id = self.id, error = %e, "Connection close failed");
        }

        let subscription = self.subscription.lock().await.take();
        if let Some(subscription) = subscription {
            subscription.release();
        }

        *self.phase.lock().unwrap() = ConnectionPhase::Closed;
        tracing::info!(session_id = self.id, "Session closed");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .finish()
    }
}

/// Drive a session's lifecycle from the engine's state-change events
///
/// Subscribed once at session creation. Advances the phase for every
/// meaningful observation and performs teardown + deregistration when
/// `Failed` is observed. Repeated `Failed` notifications are absorbed by the
/// state machine and the teardown-once guard, so the subscription is
/// released and the session removed exactly once.
pub fn spawn_state_monitor(
    session: Arc<Session>,
    registry: Arc<SessionRegistry>,
    mut events: mpsc::Receiver<RTCPeerConnectionState>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(state) = events.recv().await {
            let Some(phase) = session.observe(state) else {
                continue;
            };

            tracing::info!(
                session_id = session.id(),
                state = %state,
                phase = %phase,
                "Connection state changed"
            );

            if phase == ConnectionPhase::Failed {
                session.close().await;
                registry.remove(session.id()).await;
            }
        }
    })
}
