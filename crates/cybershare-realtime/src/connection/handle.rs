//! Individual WebSocket connection handle.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// The server side of one open socket: an outbound queue plus owner metadata.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: Uuid,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Dropped on close so the socket task's receiver ends.
    sender: Mutex<Option<mpsc::Sender<String>>>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle around an outbound queue.
    pub fn new(user_id: Uuid, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            sender: Mutex::new(Some(sender)),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a text frame. Never blocks; a full queue drops the frame.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = guard.as_ref() else {
            return false;
        };
        match sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.alive.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    /// Whether the socket task is still reading the queue.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection closed and release the outbound queue. Once
    /// drained, the receiver yields `None` and the socket task shuts down.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_after_receiver_dropped_marks_closed() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(Uuid::new_v4(), tx);
        assert!(handle.send("one".into()));
        drop(rx);
        assert!(!handle.send("two".into()));
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_full_buffer_drops_frame() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(Uuid::new_v4(), tx);
        assert!(handle.send("first".into()));
        assert!(!handle.send("second".into()));
        assert!(handle.is_alive());
        assert_eq!(rx.recv().await.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_close_ends_receiver_after_draining() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(Uuid::new_v4(), tx);
        assert!(handle.send("queued".into()));
        handle.mark_closed();
        assert!(!handle.send("late".into()));
        assert_eq!(rx.recv().await.as_deref(), Some("queued"));
        assert!(rx.recv().await.is_none());
    }
}
