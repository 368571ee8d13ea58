//! A single game room: one engine, its players, and the run loop.
//!
//! Each connected player gets a [`Connection`] (outbound queue) and feeds
//! inbound moves into the room's event channel through [`Room::events`].
//! [`Room::run`] is the only consumer of that channel. Applying a move and
//! queueing the resulting broadcast happen under the room lock in one
//! step, so every participant sees the same sequence of states.

use crate::error::RoomError;
use crate::protocol::{GameSnapshot, RoomSummary, ServerMessage};
use dropfour_connect4::{Game, GameState, PlayerId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Outbound message queue of one player.
pub type Connection = mpsc::UnboundedSender<ServerMessage>;

/// Input to a room's run loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// A player sent a move payload.
    Move {
        /// Sender of the move.
        player: PlayerId,
        /// Raw move payload, expected to be `{"col": <int>}`.
        data: serde_json::Value,
    },
    /// A player's connection closed or failed.
    Disconnected {
        /// Player whose connection was lost.
        player: PlayerId,
        /// What happened to the connection.
        reason: String,
    },
}

/// State guarded by the room lock.
#[derive(Debug)]
struct RoomInner {
    game: Game,
    connections: HashMap<PlayerId, Connection>,
}

impl RoomInner {
    /// Queues `msg` for every participant.
    ///
    /// Every connection is attempted even if an earlier one failed; the
    /// first failure is returned.
    fn broadcast(&self, msg: &ServerMessage) -> Result<(), RoomError> {
        let mut result = Ok(());
        for (player, connection) in &self.connections {
            if connection.send(msg.clone()).is_err() {
                warn!(player_id = %player, "Broadcast to closed connection");
                result = result.and(Err(RoomError::Transport(format!(
                    "connection to player {player} is closed"
                ))));
            }
        }
        result
    }

    /// Queues `msg` for one participant. Unknown players are skipped.
    fn send_to(&self, player: &str, msg: ServerMessage) -> Result<(), RoomError> {
        let Some(connection) = self.connections.get(player) else {
            debug!(player_id = player, "No connection for player, dropping message");
            return Ok(());
        };
        connection.send(msg).map_err(|_| {
            RoomError::Transport(format!("connection to player {player} is closed"))
        })
    }

    /// Tells everyone but `gone` that the room is closing, then drops all
    /// connections so their writers shut down.
    fn close(&mut self, gone: Option<&str>, reason: &str) {
        for (player, connection) in &self.connections {
            if Some(player.as_str()) != gone {
                // The peer may already be gone too; nothing left to tell it.
                let _ = connection.send(ServerMessage::Ended {
                    reason: reason.to_string(),
                });
            }
        }
        self.connections.clear();
    }
}

/// One game session plus its connected participants.
#[derive(Debug)]
pub struct Room {
    name: String,
    inner: Mutex<RoomInner>,
    events_tx: mpsc::UnboundedSender<RoomEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<RoomEvent>>>,
}

impl Room {
    /// Creates a room with an empty `columns × rows` game.
    #[instrument(skip(name), fields(room = %name))]
    pub fn new(name: String, columns: usize, rows: usize) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            name,
            inner: Mutex::new(RoomInner {
                game: Game::new(columns, rows),
                connections: HashMap::new(),
            }),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Room name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, RoomInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a player and their connection, returning the new player
    /// count.
    ///
    /// # Errors
    ///
    /// Fails with a capacity error when the game already has two players;
    /// the connection is not stored in that case.
    #[instrument(skip(self, connection), fields(room = %self.name))]
    pub fn add_player(&self, id: PlayerId, connection: Connection) -> Result<usize, RoomError> {
        let mut inner = self.lock();
        let color = inner.game.add_player(id.clone())?;
        inner.connections.insert(id.clone(), connection);
        let count = inner.game.player_count();
        info!(player_id = %id, %color, players = count, "Player joined room");
        Ok(count)
    }

    /// Number of joined players.
    pub fn player_count(&self) -> usize {
        self.lock().game.player_count()
    }

    /// Returns true when no more players can join.
    pub fn is_full(&self) -> bool {
        self.lock().game.is_full()
    }

    /// Current game state.
    pub fn state(&self) -> GameState {
        self.lock().game.state()
    }

    /// Current view of the game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(&self.lock().game)
    }

    /// Listing entry for this room.
    pub fn summary(&self) -> RoomSummary {
        let inner = self.lock();
        RoomSummary::new(
            self.name.clone(),
            inner.game.player_count(),
            inner.game.name().to_string(),
        )
    }

    /// Sender feeding this room's run loop.
    pub fn events(&self) -> mpsc::UnboundedSender<RoomEvent> {
        self.events_tx.clone()
    }

    /// Drives the game until it ends.
    ///
    /// Returns the terminal state, or a transport error if a player's
    /// connection failed first. In either case all connections are
    /// released before returning.
    ///
    /// # Errors
    ///
    /// [`RoomError::AlreadyStarted`] if called twice, otherwise
    /// [`RoomError::Transport`] when a participant drops out.
    #[instrument(skip(self), fields(room = %self.name))]
    pub async fn run(&self) -> Result<GameState, RoomError> {
        let mut events = self
            .events_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| RoomError::AlreadyStarted(self.name.clone()))?;

        info!("Room is starting");
        while !self.state().is_terminal() {
            // The room owns a sender, so the channel stays open while `self` lives.
            let Some(event) = events.recv().await else {
                break;
            };

            match event {
                RoomEvent::Move { player, data } => {
                    if let Err(err) = self.apply(&player, &data) {
                        self.lock().close(None, &err.to_string());
                        return Err(err);
                    }
                }
                RoomEvent::Disconnected { player, reason } => {
                    warn!(player_id = %player, %reason, "Player disconnected, ending room");
                    self.lock()
                        .close(Some(&player), &format!("player {player} disconnected"));
                    return Err(RoomError::Transport(format!(
                        "player {player} disconnected: {reason}"
                    )));
                }
            }
        }

        let state = self.state();
        info!(%state, "Game over");
        self.lock().connections.clear();
        Ok(state)
    }

    /// Returns true once [`Room::run`] has taken the event channel.
    pub fn is_started(&self) -> bool {
        self.events_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Applies one move and reports the outcome, all under the room lock.
    ///
    /// Rejections go to the sender only. Accepted moves are broadcast to
    /// every participant. Only a failed send is returned as an error.
    #[instrument(skip(self, data), fields(room = %self.name))]
    fn apply(&self, player: &str, data: &serde_json::Value) -> Result<(), RoomError> {
        let mut inner = self.lock();
        match inner.game.make_move(player, data) {
            Ok(cell) => {
                debug!(
                    player_id = player,
                    %cell,
                    board = %inner.game.board().display(),
                    "Move accepted"
                );
                let msg = ServerMessage::State(GameSnapshot::from(&inner.game));
                inner.broadcast(&msg)
            }
            Err(err) => {
                warn!(player_id = player, error = %err, "Move rejected");
                inner.send_to(
                    player,
                    ServerMessage::Error {
                        reason: err.to_string(),
                    },
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_room_is_empty() {
        let room = Room::new("r1".to_string(), 7, 6);
        assert_eq!(room.name(), "r1");
        assert_eq!(room.player_count(), 0);
        assert!(!room.is_full());
        assert_eq!(room.state(), GameState::Running);
        assert_eq!(
            room.summary(),
            RoomSummary::new("r1".to_string(), 0, "Connect4".to_string())
        );
    }

    #[tokio::test]
    async fn test_is_started_after_run() {
        let room = Room::new("r1".to_string(), 7, 6);
        let (tx, _rx) = mpsc::unbounded_channel();
        room.add_player("a".to_string(), tx).unwrap();
        assert!(!room.is_started());

        room.events()
            .send(RoomEvent::Disconnected {
                player: "a".to_string(),
                reason: "gone".to_string(),
            })
            .unwrap();
        assert!(room.run().await.is_err());
        assert!(room.is_started());
    }

    #[test]
    fn test_close_skips_departed_player() {
        let room = Room::new("r1".to_string(), 7, 6);
        let (a_tx, mut a_rx) = mpsc::unbounded_channel();
        let (b_tx, mut b_rx) = mpsc::unbounded_channel();
        room.add_player("a".to_string(), a_tx).unwrap();
        room.add_player("b".to_string(), b_tx).unwrap();

        room.lock().close(Some("a"), "bye");

        assert!(a_rx.try_recv().is_err());
        assert_eq!(
            b_rx.try_recv().unwrap(),
            ServerMessage::Ended {
                reason: "bye".to_string()
            }
        );
        assert!(room.lock().connections.is_empty());
    }
}
