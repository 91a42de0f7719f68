//! WebSocket support for real-time status updates.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use mediaforge_core::{NotifyError, StatusHandle, StatusNotifier};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats sent to each client.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A status message was created in a chat.
    StatusCreated {
        chat_id: String,
        message_id: String,
        text: String,
    },
    /// An existing status message was edited.
    StatusUpdated {
        chat_id: String,
        message_id: String,
        text: String,
    },
    /// A background compression job finished.
    JobFinished {
        job_id: String,
        success: bool,
        error: Option<String>,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn kind(&self) -> &'static str {
        match self {
            WsMessage::StatusCreated { .. } => "status_created",
            WsMessage::StatusUpdated { .. } => "status_updated",
            WsMessage::JobFinished { .. } => "job_finished",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    pub fn status_created(&self, handle: &StatusHandle, text: &str) {
        self.broadcast(WsMessage::StatusCreated {
            chat_id: handle.chat_id.clone(),
            message_id: handle.message_id.clone(),
            text: text.to_string(),
        });
    }

    pub fn status_updated(&self, handle: &StatusHandle, text: &str) {
        self.broadcast(WsMessage::StatusUpdated {
            chat_id: handle.chat_id.clone(),
            message_id: handle.message_id.clone(),
            text: text.to_string(),
        });
    }

    pub fn job_finished(&self, job_id: &str, error: Option<String>) {
        self.broadcast(WsMessage::JobFinished {
            job_id: job_id.to_string(),
            success: error.is_none(),
            error,
        });
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Status notifier that publishes status messages to WebSocket clients.
///
/// Delivery is fire-and-forget, so it never fails.
#[derive(Debug, Clone)]
pub struct WsStatusNotifier {
    broadcaster: WsBroadcaster,
}

impl WsStatusNotifier {
    pub fn new(broadcaster: WsBroadcaster) -> Self {
        Self { broadcaster }
    }
}

#[async_trait]
impl StatusNotifier for WsStatusNotifier {
    async fn send_status(&self, chat_id: &str, text: &str) -> Result<StatusHandle, NotifyError> {
        let handle = StatusHandle::generate(chat_id);
        self.broadcaster.status_created(&handle, text);
        Ok(handle)
    }

    async fn edit_status(&self, handle: &StatusHandle, text: &str) -> Result<(), NotifyError> {
        self.broadcaster.status_updated(handle, text);
        Ok(())
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast messages
    let mut rx = state.ws_broadcaster().subscribe();

    // Track connection metrics
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    // Spawn task to forward broadcast messages and heartbeats to this client
    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately
        heartbeat.tick().await;

        loop {
            let msg = tokio::select! {
                result = rx.recv() => match result {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, skipped {} messages", n);
                        WS_LAG_EVENTS.inc();
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => WsMessage::Heartbeat {
                    timestamp: Utc::now().timestamp(),
                },
            };

            WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                // Clients are not expected to send anything
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Clean up
    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
