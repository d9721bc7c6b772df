//! Connection pool indexed by user and by connection id.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe registry of open connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, Arc::clone(&handle));
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection, dropping the user entry when it was the last.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        self.by_user.remove_if_mut(&handle.user_id, |_, conns| {
            conns.retain(|c| c.id != *conn_id);
            conns.is_empty()
        });
        Some(handle)
    }

    /// All connections of a user.
    pub fn user_connections(&self, user_id: &Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Total number of open connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(user_id: Uuid) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(ConnectionHandle::new(user_id, tx))
    }

    #[test]
    fn test_add_and_remove_tracks_users() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();
        let a = handle(user);
        let b = handle(user);
        pool.add(Arc::clone(&a));
        pool.add(Arc::clone(&b));
        assert_eq!(pool.connection_count(), 2);
        assert_eq!(pool.user_count(), 1);

        pool.remove(&a.id);
        assert_eq!(pool.user_connections(&user).len(), 1);
        pool.remove(&b.id);
        assert_eq!(pool.user_count(), 0);
        assert!(pool.remove(&b.id).is_none());
    }
}
