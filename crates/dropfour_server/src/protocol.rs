//! Messages exchanged with connected players and listing payloads.

use dropfour_connect4::{Board, Cell, Game, GameState, PlayerId};
use serde::Serialize;

/// Full view of a game after an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Board as a list of columns, each bottom-up.
    pub board: Board,
    /// Running, won or drawn.
    pub state: GameState,
    /// Player whose turn is next; `None` once the game is over.
    pub current_player: Option<PlayerId>,
    /// Winning player, if any.
    pub winner: Option<PlayerId>,
    /// Cells forming the winning run; empty unless won.
    pub winning_run: Vec<Cell>,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        let current_player = if game.state().is_terminal() {
            None
        } else {
            game.current_player().cloned()
        };
        Self {
            board: game.board().clone(),
            state: game.state(),
            current_player,
            winner: game.winner().and_then(|c| game.player(c)).cloned(),
            winning_run: game.winning_run().to_vec(),
        }
    }
}

/// Message pushed from the server to a player connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// New game state, broadcast to every participant.
    State(GameSnapshot),
    /// Why the recipient's last move was rejected.
    Error {
        /// Human-readable reason.
        reason: String,
    },
    /// The room closed before the game finished.
    Ended {
        /// Human-readable reason.
        reason: String,
    },
}

/// One entry of the room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_new::new)]
pub struct RoomSummary {
    /// Room name.
    pub name: String,
    /// Number of joined players.
    pub players: usize,
    /// Name of the game played in the room.
    pub game: String,
}
