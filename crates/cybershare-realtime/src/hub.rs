//! Registration and fan-out for live connections.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::connection::{ConnectionHandle, ConnectionId, ConnectionPool};
use crate::message::OutboundMessage;

/// Outbound frames buffered per connection.
const CHANNEL_BUFFER: usize = 64;
/// Connections allowed per user before the oldest is replaced.
const MAX_CONNECTIONS_PER_USER: usize = 5;

/// Shared entry point for pushing messages to connected users.
#[derive(Debug, Default)]
pub struct RealtimeHub {
    pool: ConnectionPool,
}

impl RealtimeHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user_id`. The receiver yields text frames
    /// to write to the socket.
    pub fn register(&self, user_id: Uuid) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));

        let existing = self.pool.user_connections(&user_id);
        if existing.len() >= MAX_CONNECTIONS_PER_USER {
            if let Some(oldest) = existing.iter().min_by_key(|c| c.connected_at) {
                oldest.mark_closed();
                self.pool.remove(&oldest.id);
            }
        }

        self.pool.add(Arc::clone(&handle));
        info!(conn_id = %handle.id, user_id = %user_id, "WebSocket connection registered");
        (handle, rx)
    }

    /// Forget a connection.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_closed();
            info!(conn_id = %conn_id, user_id = %handle.user_id, "WebSocket connection closed");
        }
    }

    /// Push a message to every open connection of `user_id`.
    /// Returns how many connections accepted it.
    pub fn send_to_user(&self, user_id: Uuid, message: &OutboundMessage) -> usize {
        let connections = self.pool.user_connections(&user_id);
        if connections.is_empty() {
            return 0;
        }

        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound frame");
                return 0;
            }
        };

        let delivered = connections
            .iter()
            .filter(|conn| conn.send(frame.clone()))
            .count();
        debug!(user_id = %user_id, delivered, "Pushed frame to user");
        delivered
    }

    /// Whether the user has at least one open connection.
    pub fn is_online(&self, user_id: &Uuid) -> bool {
        !self.pool.user_connections(user_id).is_empty()
    }

    /// Total open connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_reaches_every_connection_of_user() {
        let hub = RealtimeHub::new();
        let user = Uuid::new_v4();
        let (_a, mut rx_a) = hub.register(user);
        let (_b, mut rx_b) = hub.register(user);
        let (_c, mut rx_other) = hub.register(Uuid::new_v4());

        let delivered = hub.send_to_user(user, &OutboundMessage::UnreadCount(3));
        assert_eq!(delivered, 2);
        assert!(rx_a.recv().await.unwrap().contains("unread_count"));
        assert!(rx_b.recv().await.is_some());
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_goes_offline() {
        let hub = RealtimeHub::new();
        let user = Uuid::new_v4();
        let (handle, _rx) = hub.register(user);
        assert!(hub.is_online(&user));
        hub.unregister(&handle.id);
        assert!(!hub.is_online(&user));
        assert_eq!(hub.send_to_user(user, &OutboundMessage::Pong), 0);
    }

    #[tokio::test]
    async fn test_oldest_connection_replaced_at_limit() {
        let hub = RealtimeHub::new();
        let user = Uuid::new_v4();
        let mut receivers = Vec::new();
        let (first, rx) = hub.register(user);
        receivers.push(rx);
        for _ in 1..MAX_CONNECTIONS_PER_USER {
            receivers.push(hub.register(user).1);
        }
        let _ = hub.register(user);
        assert_eq!(hub.connection_count(), MAX_CONNECTIONS_PER_USER);
        assert!(!first.is_alive());
    }

    #[tokio::test]
    async fn test_replaced_connection_queue_is_disconnected() {
        let hub = RealtimeHub::new();
        let user = Uuid::new_v4();
        let (_first, mut first_rx) = hub.register(user);
        let mut others = Vec::new();
        for _ in 1..MAX_CONNECTIONS_PER_USER {
            others.push(hub.register(user));
        }
        let (_newest, mut newest_rx) = hub.register(user);

        assert_eq!(
            first_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
        assert_eq!(hub.send_to_user(user, &OutboundMessage::Pong), MAX_CONNECTIONS_PER_USER);
        assert!(newest_rx.try_recv().is_ok());
    }
}
