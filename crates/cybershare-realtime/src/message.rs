//! WebSocket frame types.

use serde::{Deserialize, Serialize};

/// Frames sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A newly created notification.
    Notification(serde_json::Value),
    /// The recipient's current unread count.
    UnreadCount(i64),
    /// Reply to a client ping.
    Pong,
}

impl OutboundMessage {
    /// Serialize to a text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frames accepted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Keep-alive.
    Ping,
}
