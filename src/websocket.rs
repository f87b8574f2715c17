use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::handlers;
use crate::state::AppState;
use crate::translate::ControllerView;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// One socket is one translator view: it owns a controller for its lifetime.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_uid = state.generate_client_uid();
    info!("New WebSocket connection: {}", client_uid);

    let controller = state.open_session(&client_uid);
    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if let Err(e) = sender.send(Message::Text(text)).await {
                error!("Failed to send message: {}", e);
                break;
            }
        }
    });
    let forwarder = tokio::spawn(forward_views(controller.subscribe(), out_tx.clone()));

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = handlers::handle_message(&controller, &text) {
                    warn!("Rejected message from {}: {}", client_uid, e);
                    let _ = out_tx.send(handlers::error_message(&e.to_string()));
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", client_uid);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup
    state.close_session(&client_uid);
    forwarder.abort();
    writer.abort();

    info!("Cleaned up client {}", client_uid);
}

/// Push the current view, then every change, until either side goes away.
async fn forward_views(mut views: watch::Receiver<ControllerView>, out: mpsc::UnboundedSender<String>) {
    loop {
        let message = handlers::state_message(&views.borrow_and_update());
        match message {
            Ok(message) => {
                if out.send(message).is_err() {
                    break;
                }
            }
            Err(e) => error!("Failed to serialize controller view: {}", e),
        }
        if views.changed().await.is_err() {
            break;
        }
    }
}
