//! # cybershare-realtime
//!
//! Tracks live WebSocket connections per user and fans out server-pushed
//! messages (new notifications, unread counts) to every connection a user
//! has open. The socket itself is driven by the API crate; this crate only
//! owns the registry and the outbound queues.

pub mod connection;
pub mod hub;
pub mod message;

pub use connection::{ConnectionHandle, ConnectionId, ConnectionPool};
pub use hub::RealtimeHub;
pub use message::{InboundMessage, OutboundMessage};
