//! Per-board rooms of live WebSocket connections.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes};
use bingoals_core::realtime::BoardEvent;
use bingoals_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type RoomSender = mpsc::UnboundedSender<Message>;

/// One subscriber in a room.
pub struct RoomConnection {
    /// Authenticated user behind the connection.
    pub user_id: DbId,
    pub sender: RoomSender,
    pub connected_at: Timestamp,
}

/// Registry of board rooms.
///
/// `join` and `leave` take the write lock; `publish` holds the read lock
/// while it pushes into the per-connection channels, which never block.
/// A room is removed as soon as its last connection leaves.
pub struct BoardHub {
    rooms: RwLock<HashMap<DbId, HashMap<String, RoomConnection>>>,
}

impl BoardHub {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection to a board's room, creating the room if needed.
    ///
    /// Returns the receiver half of the connection's channel so the caller
    /// can forward messages to the socket.
    pub async fn join(
        &self,
        board_id: DbId,
        conn_id: String,
        user_id: DbId,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = RoomConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };

        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(board_id).or_default();
        room.insert(conn_id, conn);
        tracing::info!(board_id = %board_id, user_id = %user_id, room_size = room.len(), "Joined board room");
        rx
    }

    /// Remove a connection. Returns `true` if it was present.
    pub async fn leave(&self, board_id: DbId, conn_id: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(&board_id) else {
            return false;
        };
        let removed = room.remove(conn_id).is_some();
        let remaining = room.len();
        if remaining == 0 {
            rooms.remove(&board_id);
        }
        if removed {
            tracing::info!(board_id = %board_id, conn_id = %conn_id, room_size = remaining, "Left board room");
        }
        removed
    }

    /// Deliver `event` to every connection in the board's room except the
    /// ones belonging to `originator`.
    ///
    /// The event is serialized once. A failed write is logged and skipped.
    /// Returns the number of connections the message was handed to.
    pub async fn publish(&self, board_id: DbId, originator: DbId, event: &BoardEvent) -> usize {
        let payload: Utf8Bytes = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::error!(board_id = %board_id, error = %e, "Failed to serialize board event");
                return 0;
            }
        };

        let rooms = self.rooms.read().await;
        let Some(room) = rooms.get(&board_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (conn_id, conn) in room.iter().filter(|(_, c)| c.user_id != originator) {
            match conn.sender.send(Message::Text(payload.clone())) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::warn!(board_id = %board_id, conn_id = %conn_id, "Board event write failed");
                }
            }
        }

        tracing::debug!(
            board_id = %board_id,
            event_type = event.event_type.as_str(),
            delivered,
            "Board event published"
        );
        delivered
    }

    /// Close and drop every connection `user_id` holds in a board's room.
    /// Used when a member is removed from the board.
    pub async fn evict_user(&self, board_id: DbId, user_id: DbId) -> usize {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(&board_id) else {
            return 0;
        };

        let before = room.len();
        room.retain(|_, conn| {
            if conn.user_id == user_id {
                let _ = conn.sender.send(Message::Close(None));
                false
            } else {
                true
            }
        });
        let evicted = before - room.len();
        if room.is_empty() {
            rooms.remove(&board_id);
        }
        evicted
    }

    /// Number of live connections in one room.
    pub async fn room_size(&self, board_id: DbId) -> usize {
        self.rooms
            .read()
            .await
            .get(&board_id)
            .map_or(0, HashMap::len)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.rooms.read().await.values().map(HashMap::len).sum()
    }

    /// Send a Ping frame to every connection in every room.
    pub async fn ping_all(&self) {
        let rooms = self.rooms.read().await;
        for conn in rooms.values().flat_map(HashMap::values) {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Send a Close frame to every connection, then drop all rooms.
    pub async fn shutdown_all(&self) {
        let mut rooms = self.rooms.write().await;
        let mut count = 0;
        for conn in rooms.values().flat_map(HashMap::values) {
            let _ = conn.sender.send(Message::Close(None));
            count += 1;
        }
        rooms.clear();
        tracing::info!(count, "Closed all board room connections");
    }
}

impl Default for BoardHub {
    fn default() -> Self {
        Self::new()
    }
}
