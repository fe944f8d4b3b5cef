//! WebSocket support for live search session updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use reelflix_core::{ResultItem, SessionHandle, SessionId, SessionOutcome, SessionSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats on an idle connection.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A new search session started.
    SessionStarted {
        session_id: SessionId,
        query: String,
        total_sources: usize,
    },
    /// One or more sources settled.
    SessionProgress {
        session_id: SessionId,
        completed_sources: usize,
        total_sources: usize,
        /// Results that arrived since the previous progress message.
        new_results: Vec<ResultItem>,
    },
    /// Every source settled.
    SessionCompleted {
        session_id: SessionId,
        outcome: SessionOutcome,
        result_count: usize,
        failed_sources: Vec<String>,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn kind(&self) -> &'static str {
        match self {
            WsMessage::SessionStarted { .. } => "session_started",
            WsMessage::SessionProgress { .. } => "session_progress",
            WsMessage::SessionCompleted { .. } => "session_completed",
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

    pub fn session_started(&self, snapshot: &SessionSnapshot) {
        self.broadcast(WsMessage::SessionStarted {
            session_id: snapshot.id,
            query: snapshot.query.clone(),
            total_sources: snapshot.total_sources(),
        });
    }

    /// Broadcast progress, sending only results from `already_sent` onwards.
    pub fn session_progress(&self, snapshot: &SessionSnapshot, already_sent: usize) {
        self.broadcast(WsMessage::SessionProgress {
            session_id: snapshot.id,
            completed_sources: snapshot.completed_sources(),
            total_sources: snapshot.total_sources(),
            new_results: snapshot
                .results
                .get(already_sent..)
                .map(<[ResultItem]>::to_vec)
                .unwrap_or_default(),
        });
    }

    pub fn session_completed(&self, snapshot: &SessionSnapshot, outcome: SessionOutcome) {
        self.broadcast(WsMessage::SessionCompleted {
            session_id: snapshot.id,
            outcome,
            result_count: snapshot.results.len(),
            failed_sources: snapshot
                .failures()
                .into_iter()
                .map(|(name, _)| name.to_string())
                .collect(),
        });
    }

    /// Relay one session's changes until it completes or is abandoned.
    pub async fn forward_session(&self, handle: SessionHandle) {
        let mut rx = handle.subscribe();
        let mut sent_results = 0;
        let mut sent_completed = 0;

        loop {
            let snapshot = rx.borrow_and_update().clone();

            if snapshot.completed_sources() > sent_completed {
                self.session_progress(&snapshot, sent_results);
                sent_results = snapshot.results.len();
                sent_completed = snapshot.completed_sources();
            }

            if let Some(outcome) = snapshot.outcome {
                self.session_completed(&snapshot, outcome);
                return;
            }
            if snapshot.abandoned {
                debug!(session_id = %snapshot.id, "Stopped forwarding abandoned session");
                return;
            }

            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
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
        heartbeat.tick().await;

        loop {
            let msg = tokio::select! {
                result = rx.recv() => {
                    match result {
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
                    }
                }
                _ = heartbeat.tick() => WsMessage::Heartbeat {
                    timestamp: chrono::Utc::now().timestamp(),
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
