//! Connection registry
//!
//! Maps live connections to the (session, participant) pair they are bound
//! to, and maintains an explicit per-session set of connections for room
//! multicast. This is the only module that knows about raw connections; the
//! transport hands the engine an `UnboundedSender` per connection and the
//! engine never blocks on delivery.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

use crate::dispatch::ServerEvent;

/// Opaque per-connection identifier
pub type ConnectionId = u64;

/// What a bound connection is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Session the connection joined
    pub session_id: String,
    /// Participant identity on the connection
    pub participant_id: String,
}

#[derive(Debug)]
struct ConnectionEntry {
    tx: UnboundedSender<ServerEvent>,
    binding: Option<Binding>,
}

#[derive(Debug, Default)]
struct Inner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    /// Explicit room membership: session id -> bound connections
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

/// Registry of live connections and their session bindings
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection, returning its id
    pub async fn register(&self, tx: UnboundedSender<ServerEvent>) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut inner = self.inner.write().await;
        inner.connections.insert(id, ConnectionEntry { tx, binding: None });

        tracing::debug!(connection = id, "Connection registered");
        id
    }

    /// Bind a connection to a session and participant
    ///
    /// Returns `false` if the connection is gone or already bound; the caller
    /// must then roll back whatever admitted the participant.
    pub async fn bind(
        &self,
        id: ConnectionId,
        session_id: impl Into<String>,
        participant_id: impl Into<String>,
    ) -> bool {
        let mut inner = self.inner.write().await;

        let entry = match inner.connections.get_mut(&id) {
            Some(entry) if entry.binding.is_none() => entry,
            Some(_) => {
                tracing::warn!(connection = id, "Bind rejected: already bound");
                return false;
            }
            None => {
                tracing::debug!(connection = id, "Bind rejected: connection gone");
                return false;
            }
        };

        let binding = Binding {
            session_id: session_id.into(),
            participant_id: participant_id.into(),
        };
        let session_id = binding.session_id.clone();
        entry.binding = Some(binding);

        inner.rooms.entry(session_id).or_default().insert(id);
        true
    }

    /// The current binding of a connection, if any
    pub async fn binding(&self, id: ConnectionId) -> Option<Binding> {
        let inner = self.inner.read().await;
        inner.connections.get(&id).and_then(|e| e.binding.clone())
    }

    /// Atomically unbind a connection, returning what it was bound to
    ///
    /// The exactly-once guard for leave/disconnect races: whichever path
    /// takes the binding acts on it, the other sees `None`.
    pub async fn take_binding(&self, id: ConnectionId) -> Option<Binding> {
        let mut inner = self.inner.write().await;

        let binding = inner.connections.get_mut(&id)?.binding.take()?;
        if let Some(room) = inner.rooms.get_mut(&binding.session_id) {
            room.remove(&id);
            if room.is_empty() {
                inner.rooms.remove(&binding.session_id);
            }
        }
        Some(binding)
    }

    /// Drop a connection entirely, returning its binding if it was still bound
    pub async fn unregister(&self, id: ConnectionId) -> Option<Binding> {
        let binding = self.take_binding(id).await;
        let mut inner = self.inner.write().await;
        inner.connections.remove(&id);

        tracing::debug!(connection = id, "Connection unregistered");
        binding
    }

    /// Send to one connection, best effort
    pub async fn send(&self, id: ConnectionId, event: ServerEvent) {
        let inner = self.inner.read().await;
        if let Some(entry) = inner.connections.get(&id) {
            if entry.tx.send(event).is_err() {
                tracing::debug!(connection = id, "Send failed: receiver dropped");
            }
        }
    }

    /// Multicast to every bound connection in a session's room
    ///
    /// Individual send failures are tolerated; state was committed before
    /// delivery and is never rolled back for a slow or dead client.
    pub async fn multicast(
        &self,
        session_id: &str,
        except: Option<ConnectionId>,
        event: &ServerEvent,
    ) {
        let inner = self.inner.read().await;
        let Some(room) = inner.rooms.get(session_id) else {
            return;
        };

        for id in room {
            if Some(*id) == except {
                continue;
            }
            if let Some(entry) = inner.connections.get(id) {
                if entry.tx.send(event.clone()).is_err() {
                    tracing::debug!(connection = id, "Multicast send failed: receiver dropped");
                }
            }
        }
    }

    /// Number of registered connections
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Number of bound connections in a session's room
    pub async fn room_size(&self, session_id: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(session_id)
            .map_or(0, HashSet::len)
    }
}
