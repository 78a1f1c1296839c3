//! Session gateway: authenticated WebSocket connections for the desktop
//! client.
//!
//! The handshake is token-gated: a bearer token in the `Authorization`
//! header or a `token` query parameter, verified *before* the upgrade. A
//! missing or invalid token is answered with 403 and no session object is
//! ever created. There is no re-authentication mid-session.
//!
//! Each open connection gets its own reply sink; recognized inbound
//! messages are enqueued on the dispatcher bound to that sink, so responses
//! only ever reach the connection that asked.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::dispatch::{MessageDispatcher, MessageType};
use crate::domain::AuthContext;

use super::http::AppState;

/// Handle `GET /ws`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let token = bearer_token(&headers)
        .or_else(|| params.get("token").map(String::as_str))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        tracing::info!("handshake refused: missing token");
        return (StatusCode::FORBIDDEN, "Missing token").into_response();
    };

    let verified = state.verifier.verify(token).await;
    match verified {
        Ok(auth) => {
            let dispatcher = state.dispatcher.clone();
            ws.on_upgrade(move |socket| run_session(socket, auth, dispatcher))
        }
        Err(err) => {
            tracing::info!(%err, "handshake refused: invalid token");
            (StatusCode::FORBIDDEN, "Invalid token").into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Drive one authenticated session until either side closes.
async fn run_session(socket: WebSocket, auth: AuthContext, dispatcher: MessageDispatcher) {
    let connection_id = Uuid::new_v4();
    let subject = auth.subject.clone();
    tracing::info!(%connection_id, %subject, "session opened");

    let (mut sender, mut receiver) = socket.split();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    // Legacy greeting the desktop client waits for after connecting.
    if sender
        .send(Message::Text(format!("hello {subject}")))
        .await
        .is_err()
    {
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = reply_rx.recv().await {
            if sender.send(Message::Text(outbound)).await.is_err() {
                // Connection already closed; replies from here on are
                // dropped by the sink's closed channel.
                break;
            }
        }
    });

    let recv_subject = subject.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    if MessageType::is_recognized(&text) {
                        dispatcher.enqueue(text, Some(reply_tx.clone()));
                    } else {
                        tracing::debug!(
                            subject = %recv_subject,
                            "dropping unrecognized message"
                        );
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {} // binary/ping/pong: nothing to route
                Err(err) => {
                    tracing::debug!(subject = %recv_subject, %err, "receive error");
                    break;
                }
            }
        }
    });

    // Whichever side finishes first tears the other down. In-flight jobs
    // keep their sink clones; their replies go nowhere once the channel
    // closes, which is exactly the contract.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::info!(%connection_id, %subject, "session closed");
}
