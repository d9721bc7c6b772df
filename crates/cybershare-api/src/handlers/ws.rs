//! WebSocket upgrade handler for live notifications.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use cybershare_realtime::{InboundMessage, OutboundMessage};
use cybershare_service::RequestContext;

use crate::error::ApiResult;
use crate::extractors::auth::context_from_claims;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /api/ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> ApiResult<Response> {
    // Authenticate before upgrade
    let claims = state.jwt_decoder.decode_access_token(&query.token).await?;
    let ctx = context_from_claims(claims);

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, ctx, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, ctx: RequestContext, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.realtime.register(ctx.user_id);
    let conn_id = handle.id;

    info!(conn_id = %conn_id, user_id = %ctx.user_id, "WebSocket connection established");

    // Initial unread badge
    match state.notification_service.unread_count(&ctx).await {
        Ok(count) => push(&handle, &OutboundMessage::UnreadCount(count)),
        Err(e) => warn!(conn_id = %conn_id, error = %e, "Failed to load unread count"),
    }

    // Forward queued frames. The queue ends when the hub closes this
    // connection, e.g. after a newer session replaced it.
    let mut outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    let inbound = async {
        while let Some(result) = ws_rx.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<InboundMessage>(text.as_str()) {
                        Ok(InboundMessage::Ping) => push(&handle, &OutboundMessage::Pong),
                        Err(e) => debug!(conn_id = %conn_id, error = %e, "Ignoring unknown frame"),
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    };

    tokio::select! {
        () = inbound => {}
        _ = &mut outbound_task => {
            debug!(conn_id = %conn_id, "Outbound queue closed by hub");
        }
    }

    // Cleanup
    outbound_task.abort();
    state.realtime.unregister(&conn_id);

    info!(conn_id = %conn_id, user_id = %ctx.user_id, "WebSocket connection closed");
}

fn push(handle: &cybershare_realtime::ConnectionHandle, message: &OutboundMessage) {
    match message.to_frame() {
        Ok(frame) => {
            handle.send(frame);
        }
        Err(e) => warn!(conn_id = %handle.id, error = %e, "Failed to encode frame"),
    }
}
