use crate::registry::{ConnectionId, Outgoing, ProbeKind};
use crate::signaling::RelayService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use beacon_core::ClientEnvelope;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: RelayService) {
    let conn_id = ConnectionId::new();
    info!("New WebSocket connection: {}", conn_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service
        .registry()
        .register(conn_id.clone(), tx, ProbeKind::Native);

    let mut send_task = tokio::spawn(async move {
        while let Some(outgoing) = rx.recv().await {
            let frame = match outgoing {
                Outgoing::Envelope(envelope) => match serde_json::to_string(&envelope) {
                    Ok(json) => Message::Text(json.into()),
                    Err(e) => {
                        error!("Failed to serialize envelope: {}", e);
                        continue;
                    }
                },
                Outgoing::Probe => Message::Ping(Bytes::new()),
                Outgoing::Terminate => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            };

            if sender.send(frame).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let conn_id = conn_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEnvelope>(&text) {
                        Ok(envelope) => service.handle_envelope(&conn_id, envelope),
                        Err(e) => warn!("Invalid envelope from {}: {:?}", conn_id, e),
                    },
                    Message::Pong(_) => service.registry().mark_alive(&conn_id),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.disconnect(&conn_id);
    info!("WebSocket disconnected: {}", conn_id);
}
