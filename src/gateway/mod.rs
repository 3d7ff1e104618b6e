//! Connection gateway
//!
//! Maps live connections to their outbound channels and groups them into
//! rooms for broadcast. The gateway knows nothing about quiz state; it only
//! answers "who is in this room" and "deliver this event to that
//! connection". Actual socket writes happen in each connection's writer
//! task, which drains the channel registered here.

use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, RwLock};

use crate::protocol::ServerEvent;

#[derive(Default)]
struct GatewayInner {
    /// Outbound channel per live connection
    peers: HashMap<u64, mpsc::UnboundedSender<ServerEvent>>,

    /// Room membership for broadcast fan-out
    rooms: HashMap<String, HashSet<u64>>,

    /// Which room each connection is in (at most one)
    membership: HashMap<u64, String>,
}

/// Routes server events to connections and rooms
pub struct ConnectionGateway {
    inner: RwLock<GatewayInner>,
}

impl ConnectionGateway {
    /// Create an empty gateway
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GatewayInner::default()),
        }
    }

    /// Register a connection's outbound channel
    pub async fn register(&self, connection_id: u64, sender: mpsc::UnboundedSender<ServerEvent>) {
        let mut inner = self.inner.write().await;
        inner.peers.insert(connection_id, sender);
    }

    /// Drop a connection and its room membership
    ///
    /// Idempotent; tearing down an unknown connection is a no-op.
    pub async fn unregister(&self, connection_id: u64) {
        let mut inner = self.inner.write().await;
        inner.peers.remove(&connection_id);

        if let Some(room) = inner.membership.remove(&connection_id) {
            if let Some(members) = inner.rooms.get_mut(&room) {
                members.remove(&connection_id);
                if members.is_empty() {
                    inner.rooms.remove(&room);
                }
            }
        }
    }

    /// Put a connection into a room for broadcast purposes
    ///
    /// A connection belongs to at most one room; joining another replaces
    /// the previous membership.
    pub async fn join_room(&self, connection_id: u64, room_code: &str) {
        let mut inner = self.inner.write().await;

        if let Some(previous) = inner.membership.remove(&connection_id) {
            if let Some(members) = inner.rooms.get_mut(&previous) {
                members.remove(&connection_id);
                if members.is_empty() {
                    inner.rooms.remove(&previous);
                }
            }
        }

        inner
            .rooms
            .entry(room_code.to_string())
            .or_default()
            .insert(connection_id);
        inner
            .membership
            .insert(connection_id, room_code.to_string());
    }

    /// Send an event to one connection
    ///
    /// Returns false if the connection is gone; the event is dropped.
    pub async fn send_to(&self, connection_id: u64, event: ServerEvent) -> bool {
        let inner = self.inner.read().await;
        match inner.peers.get(&connection_id) {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Send an event to every connection in a room
    pub async fn broadcast_to_room(&self, room_code: &str, event: ServerEvent) {
        self.broadcast_inner(room_code, None, event).await;
    }

    /// Send an event to every connection in a room except one
    pub async fn broadcast_to_room_except(
        &self,
        room_code: &str,
        skip: u64,
        event: ServerEvent,
    ) {
        self.broadcast_inner(room_code, Some(skip), event).await;
    }

    async fn broadcast_inner(&self, room_code: &str, skip: Option<u64>, event: ServerEvent) {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room_code) else {
            return;
        };

        for connection_id in members {
            if skip == Some(*connection_id) {
                continue;
            }
            if let Some(sender) = inner.peers.get(connection_id) {
                // A closed receiver means the connection is mid-teardown;
                // its disconnect event will clean up membership
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Number of live connections
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.peers.len()
    }

    /// Number of connections grouped into a room
    pub async fn room_size(&self, room_code: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room_code)
            .map_or(0, HashSet::len)
    }
}

impl Default for ConnectionGateway {
    fn default() -> Self {
        Self::new()
    }
}
