// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live change-feed streaming for connected clients.
//!
//! This module provides read-only, non-authoritative change notifications
//! via WebSocket connections. Events describe what changed in a
//! building's records, not directives or domain logic.
//!
//! # Architecture
//!
//! - Events are broadcast process-wide and filtered per connection by
//!   building, so a client only sees its own tenant's changes
//! - Delivery is best-effort and at-least-once; a client that lags past
//!   the buffer is dropped and must re-fetch over HTTP
//! - No ordering is guaranteed across records; consumers fold events into
//!   their own state and treat the HTTP API as authoritative
//! - No commands are executed over WebSocket connections

use axum::{
    extract::{
        Path, State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
/// If clients cannot keep up, older events will be dropped.
const EVENT_BUFFER_SIZE: usize = 100;

/// The kind of change a feed event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    /// A record was created.
    Insert,
    /// A record was modified.
    Update,
    /// A record was removed.
    Delete,
}

/// A change-feed event.
///
/// These events are derived from successful mutations, purely
/// informational, and never the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A record changed in some building-scoped table.
    Change {
        /// The kind of change.
        op: ChangeOp,
        /// The logical table name (e.g. `visitors`, `bookings`).
        table: String,
        /// The building the record belongs to.
        building_id: i64,
        /// The changed record, serialized as it appears over HTTP.
        record: serde_json::Value,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// The building this connection is filtered to.
        building_id: i64,
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

impl ChangeEvent {
    /// The building this event belongs to.
    const fn building_id(&self) -> i64 {
        match self {
            Self::Change { building_id, .. } | Self::Connected { building_id, .. } => *building_id,
        }
    }
}

/// Broadcaster for change-feed events.
///
/// This is a lightweight wrapper around `tokio::sync::broadcast` that
/// allows multiple WebSocket clients to receive change notifications.
#[derive(Clone)]
pub struct ChangeFeedBroadcaster {
    /// The broadcast channel sender.
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeedBroadcaster {
    /// Creates a new broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all connected clients.
    ///
    /// If no clients are connected, the event is silently dropped.
    /// This is non-blocking and will not wait for clients to receive the event.
    pub fn broadcast(&self, event: &ChangeEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast change event");
            }
            Err(_) => {
                // No receivers, which is fine
                debug!(?event, "No receivers for change event");
            }
        }
    }

    /// Subscribes to the event stream.
    ///
    /// Returns a receiver that will receive all future events.
    /// Events sent before subscription are not received.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeedBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket handler that upgrades HTTP connections and streams a
/// building's change events.
///
/// # Arguments
///
/// * `ws` - WebSocket upgrade request
/// * `building_id` - The building to filter the stream to
/// * `broadcaster` - The change-feed broadcaster from application state
///
/// # Returns
///
/// An HTTP response that upgrades the connection to WebSocket
pub async fn change_feed_handler(
    ws: WebSocketUpgrade,
    Path(building_id): Path<i64>,
    AxumState(broadcaster): AxumState<Arc<ChangeFeedBroadcaster>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, building_id, broadcaster))
}

/// Handles an individual WebSocket connection.
///
/// Sends a connection confirmation, then streams the building's change
/// events until the client disconnects or an error occurs.
async fn handle_socket(
    socket: WebSocket,
    building_id: i64,
    broadcaster: Arc<ChangeFeedBroadcaster>,
) {
    info!(building_id, "Client connected to change feed");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<ChangeEvent> = broadcaster.subscribe();

    // Send connection confirmation
    let connected_event = ChangeEvent::Connected {
        building_id,
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    // Task for sending the tenant's events to the client
    let mut send_task = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            // Tenant isolation: only this building's events pass
            if event.building_id() != building_id {
                continue;
            }

            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize change event");
                }
            }
        }
    });

    // Task for receiving messages from the client (though we don't expect any)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    // We don't process commands over WebSocket
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Ping/pong handled automatically by Axum
                }
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!(building_id, "Client disconnected from change feed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(building_id: i64, table: &str) -> ChangeEvent {
        ChangeEvent::Change {
            op: ChangeOp::Insert,
            table: table.to_string(),
            building_id,
            record: serde_json::json!({"id": 1}),
        }
    }

    #[test]
    fn test_broadcaster_creation() {
        let broadcaster = ChangeFeedBroadcaster::new();
        assert_eq!(broadcaster.tx.receiver_count(), 0);
    }

    #[test]
    fn test_broadcast_no_receivers() {
        let broadcaster = ChangeFeedBroadcaster::new();
        // Should not panic when no receivers
        broadcaster.broadcast(&change(1, "visitors"));
    }

    #[test]
    fn test_broadcast_with_receiver() {
        let broadcaster = ChangeFeedBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast(&change(7, "bookings"));

        match rx.try_recv() {
            Ok(ChangeEvent::Change {
                op: ChangeOp::Insert,
                building_id: 7,
                ..
            }) => {}
            other => panic!("Expected Change event, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_receivers() {
        let broadcaster = ChangeFeedBroadcaster::new();
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        broadcaster.broadcast(&change(1, "notices"));

        // Both receivers should get the event
        assert!(matches!(rx1.try_recv(), Ok(ChangeEvent::Change { .. })));
        assert!(matches!(rx2.try_recv(), Ok(ChangeEvent::Change { .. })));
    }

    #[test]
    fn test_event_serialization() {
        let event = change(3, "visitors");

        let json = serde_json::to_string(&event).expect("Failed to serialize");
        let deserialized: ChangeEvent = serde_json::from_str(&json).expect("Failed to deserialize");

        match deserialized {
            ChangeEvent::Change {
                op,
                table,
                building_id,
                ..
            } => {
                assert_eq!(op, ChangeOp::Insert);
                assert_eq!(table, "visitors");
                assert_eq!(building_id, 3);
            }
            ChangeEvent::Connected { .. } => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_building_filter_key() {
        assert_eq!(change(9, "chat_messages").building_id(), 9);
    }
}
