use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use hallbook_types::events::PortalEvent;

/// Manages all connected viewer sessions and broadcasts booking events.
///
/// Sessions are tracked in an explicit registry keyed by session id, with
/// add/remove on connect/disconnect. Delivery is best-effort and at most
/// once per connected session; nothing is replayed to late joiners.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Broadcast channel for portal events — all connected sessions receive
    /// all events, originator included.
    broadcast_tx: broadcast::Sender<PortalEvent>,

    /// Connected sessions: session_id -> connect time.
    sessions: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to portal events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<PortalEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected sessions.
    pub fn broadcast(&self, event: PortalEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }

    /// Register a new viewer session. Returns its session id.
    pub async fn register_session(&self) -> Uuid {
        let session_id = Uuid::new_v4();
        self.inner
            .sessions
            .write()
            .await
            .insert(session_id, Utc::now());
        session_id
    }

    pub async fn unregister_session(&self, session_id: Uuid) {
        self.inner.sessions.write().await.remove(&session_id);
    }

    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
