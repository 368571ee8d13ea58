//! HTTP and WebSocket transport.
//!
//! Thin wrappers around the [`RoomRegistry`]: create and list rooms over
//! plain HTTP, join a room by upgrading to a WebSocket. Each socket gets a
//! writer task draining the player's [`Connection`](crate::Connection) and
//! a reader loop feeding the room's event channel.

use crate::error::RoomError;
use crate::protocol::{RoomSummary, ServerMessage};
use crate::registry::RoomRegistry;
use crate::room::{Room, RoomEvent};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use dropfour_connect4::{MAX_PLAYERS, MoveError, PlayerId};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Query string of the create endpoint.
#[derive(Debug, Deserialize)]
pub struct NewRoomQuery {
    /// Name of the room to create.
    #[serde(default)]
    pub name: String,
}

/// Query string of the join endpoint.
#[derive(Debug, Deserialize)]
pub struct JoinRoomQuery {
    /// Name of the room to join.
    #[serde(default)]
    pub name: String,
    /// Player id; must be a UUID.
    #[serde(default)]
    pub uuid: String,
}

/// Builds the application router around `registry`.
///
/// Every response allows any origin.
pub fn router(registry: RoomRegistry) -> Router {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/new", get(new_room).post(new_room))
        .route("/rooms/join", get(join_room))
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Checks that `raw` is a UUID and returns it as a player id.
pub fn validate_player_id(raw: &str) -> Result<PlayerId, RoomError> {
    Uuid::parse_str(raw)
        .map(|_| raw.to_string())
        .map_err(|_| RoomError::InvalidPlayerId(raw.to_string()))
}

#[instrument(skip(registry))]
async fn list_rooms(State(registry): State<RoomRegistry>) -> Json<Vec<RoomSummary>> {
    let rooms = registry.list();
    debug!(count = rooms.len(), "Listed rooms");
    Json(rooms)
}

#[instrument(skip(registry))]
async fn new_room(
    State(registry): State<RoomRegistry>,
    Query(query): Query<NewRoomQuery>,
) -> Result<StatusCode, RoomError> {
    registry.create(&query.name)?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(registry, ws))]
async fn join_room(
    State(registry): State<RoomRegistry>,
    Query(query): Query<JoinRoomQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, RoomError> {
    let room = registry.get(&query.name)?;
    let player = validate_player_id(&query.uuid)?;
    if room.is_full() {
        warn!(room = %query.name, "Join refused, room is full");
        return Err(MoveError::GameFull.into());
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(registry, room, player, socket)))
}

/// Serves one player's socket until it closes.
#[instrument(skip(registry, room, socket), fields(room = %room.name()))]
async fn handle_socket(
    registry: RoomRegistry,
    room: Arc<Room>,
    player: PlayerId,
    socket: WebSocket,
) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Writer: drains the player's queue until the room drops its sender.
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Failed to encode server message");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                debug!("Socket closed while sending");
                return;
            }
        }
        if let Err(e) = sink.send(Message::Close(None)).await {
            debug!(error = %e, "Socket already closed");
        }
    });

    let players = match room.add_player(player.clone(), tx.clone()) {
        Ok(players) => players,
        Err(err) => {
            warn!(player_id = %player, error = %err, "Join failed after upgrade");
            if tx.send(ServerMessage::Error { reason: err.to_string() }).is_err() {
                debug!("Writer already gone");
            }
            return;
        }
    };
    // From here on the room holds the only sender.
    drop(tx);

    if players == MAX_PLAYERS {
        registry.launch(Arc::clone(&room));
    }

    let events = room.events();

    let reason = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                // Unparseable text is passed through so the engine rejects
                // it as a malformed move and tells the sender.
                let data = serde_json::from_str(text.as_str())
                    .unwrap_or_else(|_| serde_json::Value::String(text.as_str().to_string()));
                let event = RoomEvent::Move {
                    player: player.clone(),
                    data,
                };
                if events.send(event).is_err() {
                    break "room closed".to_string();
                }
            }
            Some(Ok(Message::Close(_))) | None => break "connection closed".to_string(),
            Some(Ok(_)) => {}
            Some(Err(e)) => break e.to_string(),
        }
    };

    info!(player_id = %player, %reason, "Player left");
    if events
        .send(RoomEvent::Disconnected { player, reason })
        .is_err()
    {
        debug!("Room already finished");
    }
    // Nobody will run a room that never started; drop it now.
    registry.abandon(&room);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_id() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert_eq!(validate_player_id(id), Ok(id.to_string()));
        assert_eq!(
            validate_player_id("not-a-uuid"),
            Err(RoomError::InvalidPlayerId("not-a-uuid".to_string()))
        );
        assert!(validate_player_id("").is_err());
    }
}
