use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::app::SharedState;
use crate::{background, events};

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Set by user-facing surfaces (e.g. `popup`) to get live refreshes
    /// while connected. The extension shim connects without it.
    pub surface: Option<String>,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.surface))
}

async fn handle_socket(socket: WebSocket, state: SharedState, surface: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe_ws();

    // Send connection confirmation
    let client_id = uuid::Uuid::new_v4().to_string();
    let welcome = events::message(events::CONNECTED, &serde_json::json!({ "clientId": client_id }));
    if sender.send(Message::Text(welcome.into())).await.is_err() {
        return;
    }

    tracing::info!(surface = surface.as_deref().unwrap_or("-"), "WebSocket client connected: {}", client_id);

    // サーフェス接続中のみ定期更新を回す
    let _surface_guard = surface.as_ref().map(|_| {
        let token = state.shutdown_token().child_token();
        tokio::spawn(background::surface_refresh_loop(state.clone(), token.clone()));
        token.drop_guard()
    });

    // シムは保留中のホストコマンドを受け取る
    let is_shim = surface.is_none();
    if is_shim {
        state.host().shim_connected();
    }

    // Forward broadcast messages to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = next_outbound(&mut rx).await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive messages from this client
    let ws_tx = state.ws_sender().clone();
    let cid = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_client_message(&text, &ws_tx),
                Message::Close(_) => break,
                _ => {}
            }
        }
        tracing::info!("WebSocket client disconnected: {}", cid);
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if is_shim {
        state.host().shim_disconnected();
    }
}

/// Next broadcast message for a client. A lagging client skips what it
/// missed and stays connected; `None` once the channel closes.
async fn next_outbound(rx: &mut broadcast::Receiver<String>) -> Option<String> {
    loop {
        match rx.recv().await {
            Ok(msg) => return Some(msg),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "WebSocket client lagged behind broadcast");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Route incoming client messages.
fn handle_client_message(text: &str, ws_tx: &broadcast::Sender<String>) {
    let Ok(msg) = serde_json::from_str::<serde_json::Value>(text) else {
        tracing::debug!("Ignoring non-JSON WebSocket message");
        return;
    };
    match msg.get("type").and_then(|t| t.as_str()).unwrap_or("") {
        "ping" => {
            let _ = ws_tx.send(serde_json::json!({ "type": events::PONG }).to_string());
        }
        other => tracing::debug!(kind = other, "Ignoring WebSocket message"),
    }
}
