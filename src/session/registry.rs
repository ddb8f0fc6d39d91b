//! Session registry
//!
//! The concurrent set of live sessions. The registry is the only mutable
//! state shared across concurrent signaling operations: membership is added
//! before negotiation completes (so a concurrent shutdown is guaranteed to
//! see the session) and removed exactly once on teardown.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::session::Session;

/// Concurrent set of active sessions
///
/// Thread-safe via `RwLock`; contention is bounded by the concurrent client
/// count, so a single lock suffices.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<u64, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session
    pub async fn insert(&self, session: Arc<Session>) {
        let id = session.id();
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session);

        tracing::debug!(session_id = id, sessions = sessions.len(), "Session registered");
    }

    /// Deregister a session by ID
    ///
    /// Idempotent: removing a non-member is a no-op. Returns whether the
    /// session was present.
    pub async fn remove(&self, id: u64) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id).is_some();

        if removed {
            tracing::debug!(session_id = id, sessions = sessions.len(), "Session deregistered");
        }

        removed
    }

    /// Look up a live session
    pub async fn get(&self, id: u64) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Close every registered session and clear the registry
    ///
    /// Snapshots the membership, requests all closures concurrently, waits
    /// for them to complete, then clears unconditionally. Best-effort over
    /// the snapshot: a session registered after the snapshot is taken is not
    /// guaranteed to be closed by this call.
    pub async fn shutdown_all(&self) {
        let snapshot: Vec<Arc<Session>> =
            self.sessions.read().await.values().cloned().collect();

        if !snapshot.is_empty() {
            tracing::info!(sessions = snapshot.len(), "Closing all sessions");
        }

        futures::future::join_all(snapshot.iter().map(|session| session.close())).await;

        self.sessions.write().await.clear();
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ConnectionPhase;
    use crate::signaling::build_api;

    async fn test_session(id: u64) -> Arc<Session> {
        let api = build_api().unwrap();
        let pc = api
            .new_peer_connection(Default::default())
            .await
            .unwrap();
        Arc::new(Session::new(id, Arc::new(pc)))
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let registry = SessionRegistry::new();

        registry.insert(test_session(1).await).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(1).await.is_some());

        assert!(registry.remove(1).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.insert(test_session(1).await).await;

        assert!(registry.remove(1).await);
        assert!(!registry.remove(1).await);
        // Never a member
        assert!(!registry.remove(42).await);
    }

    #[tokio::test]
    async fn test_shutdown_all_closes_and_clears() {
        let registry = SessionRegistry::new();
        let a = test_session(1).await;
        let b = test_session(2).await;
        registry.insert(Arc::clone(&a)).await;
        registry.insert(Arc::clone(&b)).await;

        registry.shutdown_all().await;

        assert!(registry.is_empty().await);
        assert_eq!(a.phase(), ConnectionPhase::Closed);
        assert_eq!(b.phase(), ConnectionPhase::Closed);
    }

    #[tokio::test]
    async fn test_shutdown_all_on_empty_registry() {
        let registry = SessionRegistry::new();
        registry.shutdown_all().await;
        assert!(registry.is_empty().await);
    }
}
