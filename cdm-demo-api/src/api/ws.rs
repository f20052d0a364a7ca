use super::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use cdm::{PubSubMessage, Topic};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::collections::HashSet;
use tokio::sync::broadcast::error::RecvError;

pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// One pub/sub session. Client frames change the topic set (or publish to
/// the bus); bus messages are forwarded when their topic is subscribed.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.event_bus.subscribe();
    let mut topics: HashSet<Topic> = HashSet::new();
    info!("Pub/sub session opened");

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("Websocket receive error: {}", e);
                        break;
                    }
                };
                match serde_json::from_str::<PubSubMessage>(&text) {
                    Ok(PubSubMessage::Subscribe { topic }) => {
                        debug!("Subscribe {}", topic);
                        topics.insert(topic);
                    }
                    Ok(PubSubMessage::Unsubscribe { topic }) => {
                        debug!("Unsubscribe {}", topic);
                        topics.remove(&topic);
                    }
                    Ok(message @ PubSubMessage::Publish { .. }) => state.event_bus.publish(message),
                    Err(e) => warn!("Ignoring malformed pub/sub frame: {}", e),
                }
            }
            message = rx.recv() => {
                let message = match message {
                    Ok(message) => message,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Pub/sub session lagged, skipped {} messages", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if !matches!(message, PubSubMessage::Publish { .. }) || !topics.contains(message.topic()) {
                    continue;
                }
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Could not encode pub/sub message: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }

    info!("Pub/sub session closed");
}
