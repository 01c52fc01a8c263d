use std::sync::Arc;
use axum::{
    extract::{State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use crate::models::ReceivedMessage;
use crate::state::AppState;
use crate::websocket::gateway::Gateway;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    debug!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state.gateway))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, gateway: Arc<Gateway>) {
    let (connection_id, mut outbound) = gateway.connect().await;

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Drain this connection's queue onto the socket
    let writer_id = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize {} for {}: {}", msg.event(), writer_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                return;
            }
        }
        // Queue closed by the gateway, e.g. after the connection lagged
        let _ = sender.send(Message::Close(None)).await;
    });

    // Events from one connection are handled one at a time, in arrival order
    let reader_id = connection_id.clone();
    let reader_gateway = gateway.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!("WebSocket error on {}: {}", reader_id, e);
                    break;
                }
            };

            let json_msg: ReceivedMessage = match serde_json::from_str(&text) {
                Ok(json_msg) => json_msg,
                Err(e) => {
                    warn!("Failed to parse message from {}: {}", reader_id, e);
                    continue;
                }
            };
            debug!("Received message from {}: {:?}", reader_id, json_msg);
            reader_gateway.dispatch(&reader_id, json_msg).await;
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    gateway.disconnect(&connection_id).await;
    info!("WebSocket connection {} terminated", connection_id);
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::routes::create_app;
    use crate::state::AppState;
    use futures_util::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tokio::net::TcpStream;
    use tokio::time::{timeout, Duration};
    use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    /// Serve the full app on a free port
    async fn start_server() -> (String, AppState) {
        let state = AppState::new(Config::default());
        let app = create_app(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("ws://{addr}/ws"), state)
    }

    async fn connect(url: &str) -> Client {
        let (client, _) = connect_async(url).await.unwrap();
        client
    }

    async fn send(client: &mut Client, value: Value) {
        client.send(Message::text(value.to_string())).await.unwrap();
    }

    /// Next JSON frame, failing the test after two seconds
    async fn recv(client: &mut Client) -> Value {
        loop {
            let frame = timeout(Duration::from_secs(2), client.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("stream ended")
                .unwrap();
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    async fn assert_silent(client: &mut Client) {
        let res = timeout(Duration::from_millis(150), client.next()).await;
        assert!(res.is_err(), "unexpected frame: {res:?}");
    }

    #[tokio::test]
    async fn join_edit_and_leave_over_websocket() {
        let (url, state) = start_server().await;
        let session_id = state.store.create().await.id;
        let mut a = connect(&url).await;
        let mut b = connect(&url).await;

        send(&mut a, json!({ "event": "join-session", "data": session_id })).await;
        assert_eq!(
            recv(&mut a).await,
            json!({ "event": "session-state", "data": {
                "code": "// Write your code here\n", "language": "javascript", "participants": 1
            }})
        );

        send(&mut b, json!({ "event": "join", "data": session_id })).await;
        let state_b = recv(&mut b).await;
        assert_eq!(state_b["event"], "session-state");
        assert_eq!(state_b["data"]["participants"], 2);
        let joined = recv(&mut a).await;
        assert_eq!(joined["event"], "user-joined");
        assert_eq!(joined["data"]["totalParticipants"], 2);

        send(&mut a, json!({ "event": "code-change", "data": { "sessionId": session_id, "code": "x=1" } })).await;
        assert_eq!(
            recv(&mut b).await,
            json!({ "event": "code-update", "data": { "code": "x=1" } })
        );
        assert_silent(&mut a).await;

        b.close(None).await.unwrap();
        let left = recv(&mut a).await;
        assert_eq!(left["event"], "user-left");
        assert_eq!(left["data"]["totalParticipants"], 1);
        assert_eq!(state.store.get(&session_id).await.unwrap().participant_count(), 1);
    }

    #[tokio::test]
    async fn invalid_session_and_garbage_frames() {
        let (url, _state) = start_server().await;
        let mut a = connect(&url).await;

        a.send(Message::text("not json")).await.unwrap();
        send(&mut a, json!({ "event": "join", "data": "invalid-session-id" })).await;

        // The garbage frame is skipped and the connection stays usable
        assert_eq!(
            recv(&mut a).await,
            json!({ "event": "error", "data": { "message": "Session not found" } })
        );
    }
}
