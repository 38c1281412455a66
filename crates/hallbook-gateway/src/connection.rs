use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, trace, warn};

use crate::dispatcher::Dispatcher;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Handle a single viewer WebSocket connection.
///
/// Viewers need no handshake: the session is registered on connect, receives
/// every broadcast event live until it disconnects, and is removed from the
/// registry on the way out. Anything the client sends besides Pong/Close is
/// ignored.
pub async fn handle_connection(socket: WebSocket, dispatcher: Dispatcher) {
    let (mut sender, mut receiver) = socket.split();

    let session_id = dispatcher.register_session().await;
    let mut broadcast_rx = dispatcher.subscribe();

    info!("viewer session {} connected", session_id);

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;
    let mut missed_heartbeats: u8 = 0;
    let mut pong_received = true;

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                let event = match result {
                    Ok(event) => event,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("session {} lagged by {} events", session_id, n);
                        continue;
                    }
                    Err(_) => break,
                };

                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("failed to serialize event: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {
                        pong_received = true;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(Message::Text(text))) => {
                        trace!("session {} sent ignored payload: {}", session_id,
                            truncate_at_boundary(&text, 120));
                    }
                    Some(Ok(_)) => {}
                }
            }
            _ = heartbeat.tick() => {
                if pong_received {
                    missed_heartbeats = 0;
                } else {
                    missed_heartbeats += 1;
                    if missed_heartbeats >= 2 {
                        warn!(
                            "session {} heartbeat timeout (missed {} pongs), dropping",
                            session_id, missed_heartbeats
                        );
                        break;
                    }
                }
                pong_received = false;
                if sender.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }
        }
    }

    dispatcher.unregister_session(session_id).await;
    info!("viewer session {} disconnected", session_id);
}

/// Cut `text` to at most `max` bytes without splitting a multibyte
/// character. A raw byte slice would panic on a crafted frame and take the
/// connection task (and its registry entry) down with it.
fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::truncate_at_boundary;

    #[test]
    fn truncation_never_splits_a_character() {
        let mut frame = String::from("a");
        for _ in 0..100 {
            frame.push('é');
        }
        // Byte 120 lands inside the 60th 'é'.
        assert!(!frame.is_char_boundary(120));

        let cut = truncate_at_boundary(&frame, 120);
        assert_eq!(cut.len(), 119);
        assert!(cut.ends_with('é'));

        assert_eq!(truncate_at_boundary("short", 120), "short");
        assert_eq!(truncate_at_boundary("exact", 5), "exact");
    }
}
