//! WebSocket Transport
//!
//! Upgrades the connection, opens a session on the hub, and runs two halves:
//! a writer task that drains the session's outbound queue into the socket,
//! and a read loop that dispatches client frames to the hub. The read loop
//! also watches the session's close signal so a force-closed connection
//! (queue overflow) tears down promptly even while the client is idle.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::domain::UserId;
use crate::presentation::websocket::messages::{ClientFrame, ServerFrame};
use crate::realtime::{ConnectionSession, RealtimeHub};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsParams {
    pub user_id: UserId,
}

/// GET /ws?userId=...
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub, params.user_id))
}

async fn handle_socket(socket: WebSocket, hub: Arc<RealtimeHub>, user: UserId) {
    let (session, mut outbound) = hub.connect(user);
    let conn = session.id();
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let frame = ServerFrame::from(event);
            match serde_json::to_string(&frame) {
                Ok(text) => {
                    if sink.send(WsMessage::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize outbound frame");
                }
            }
        }
        let _ = sink.close().await;
    });

    let mut close_signal = session.close_signal();
    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => handle_frame(&hub, &session, text.as_str()),
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %conn, error = %e, "WebSocket read error");
                    break;
                }
            },
            _ = close_signal.changed() => break,
        }
    }

    hub.disconnect(conn);
    writer.abort();
}

fn handle_frame(hub: &RealtimeHub, session: &ConnectionSession, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed client frame");
            return;
        }
    };

    let conn = session.id();
    match frame {
        ClientFrame::JoinChat(chat) => hub.join(conn, chat),
        ClientFrame::LeaveChat(chat) => hub.leave(conn, chat),
        // The sender's HTTP request already persisted the message; this
        // frame only asks for the relay.
        ClientFrame::SendMessage { chat_id, message } => hub.dispatch(chat_id, message),
        ClientFrame::Typing { chat_id, user_id } => {
            hub.typing_start(chat_id, user_id, Some(conn));
        }
        ClientFrame::StopTyping { chat_id, user_id } => {
            hub.typing_stop(chat_id, user_id, Some(conn));
        }
        ClientFrame::UserOnline(user) => hub.set_online(user),
        ClientFrame::UserOffline(user) => hub.set_offline(user),
    }
}
