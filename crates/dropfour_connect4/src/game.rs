//! Turn-based four-in-a-row engine.
//!
//! [`Game`] owns the board, the two registered players and whose turn it
//! is. Every mutation goes through [`Game::make_move`] (or [`Game::play`]
//! once the caller already knows the color), which validates the move in a
//! fixed order and only touches the board when every check passes.

use crate::{Board, Cell, Color, GameState, MoveError, PlayerId};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Maximum number of players in a game.
pub const MAX_PLAYERS: usize = 2;

/// Name reported in room listings.
pub const GAME_NAME: &str = "Connect4";

/// Wire shape of a move: `{"col": <int>}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MovePayload {
    col: i64,
}

/// A single game of four-in-a-row between two players.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    players: HashMap<Color, PlayerId>,
    colors: HashMap<PlayerId, Color>,
    turn: Color,
    state: GameState,
    winning_run: Vec<Cell>,
}

impl Game {
    /// Creates a running game with an empty board and no players.
    #[instrument]
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            board: Board::new(columns, rows),
            players: HashMap::new(),
            colors: HashMap::new(),
            turn: Color::Red,
            state: GameState::Running,
            winning_run: Vec::new(),
        }
    }

    /// Name of the game.
    pub fn name(&self) -> &'static str {
        GAME_NAME
    }

    /// Registers a player and returns the assigned color.
    ///
    /// The first player gets [`Color::Yellow`] and the second gets
    /// [`Color::Red`]. Red always opens, so the second player to join moves
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameFull`] once two players are registered and
    /// [`MoveError::AlreadyJoined`] if `id` is already registered.
    #[instrument(skip(self), fields(players = self.players.len()))]
    pub fn add_player(&mut self, id: PlayerId) -> Result<Color, MoveError> {
        if self.players.len() >= MAX_PLAYERS {
            warn!(player_id = %id, "Game already has 2 players");
            return Err(MoveError::GameFull);
        }
        if self.colors.contains_key(&id) {
            warn!(player_id = %id, "Player already registered");
            return Err(MoveError::AlreadyJoined(id));
        }

        let color = if self.players.contains_key(&Color::Yellow) {
            Color::Red
        } else {
            Color::Yellow
        };

        info!(player_id = %id, %color, "Registering player");
        self.players.insert(color, id.clone());
        self.colors.insert(id, color);
        Ok(color)
    }

    /// Applies a move sent by `player` as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unregistered player or a payload
    /// other than `{"col": <int>}`, otherwise whatever [`Game::play`]
    /// returns.
    #[instrument(skip(self, data), fields(state = %self.state))]
    pub fn make_move(
        &mut self,
        player: &str,
        data: &serde_json::Value,
    ) -> Result<Cell, MoveError> {
        let color = self
            .color_of(player)
            .ok_or_else(|| MoveError::UnknownPlayer(player.to_string()))?;

        // Serde would otherwise accept `[3]` as a tuple-shaped struct.
        if !data.is_object() {
            return Err(MoveError::InvalidPayload(format!("expected an object, got {data}")));
        }
        let payload = MovePayload::deserialize(data)
            .map_err(|e| MoveError::InvalidPayload(e.to_string()))?;

        self.play(color, payload.col)
    }

    /// Drops a `color` piece into `column`.
    ///
    /// Checks run in order and stop at the first failure: game running,
    /// color holds the turn, column in range, column not full. Nothing is
    /// mutated when a check fails.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`], [`MoveError::NotYourTurn`],
    /// [`MoveError::ColumnOutOfRange`] or [`MoveError::ColumnFull`].
    #[instrument(skip(self), fields(turn = %self.turn))]
    pub fn play(&mut self, color: Color, column: i64) -> Result<Cell, MoveError> {
        if self.state.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if color != self.turn {
            return Err(MoveError::NotYourTurn);
        }
        let col = usize::try_from(column)
            .ok()
            .filter(|&c| self.board.in_range(Cell::new(c, 0)))
            .ok_or(MoveError::ColumnOutOfRange(column))?;

        let cell = self.board.update(col, color)?;
        debug!(%cell, %color, "Piece placed");

        if let Some(run) = self.board.find_four(cell) {
            info!(%color, run_len = run.len(), "Four in a row");
            self.winning_run = run;
            self.state = GameState::Won;
        } else if self.board.is_full() {
            info!("Board full, game drawn");
            self.state = GameState::Drawn;
        } else {
            self.turn = color.next();
        }

        Ok(cell)
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the game state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Returns the color holding the turn. Frozen once the game ends.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the id of the player holding the turn.
    pub fn current_player(&self) -> Option<&PlayerId> {
        self.players.get(&self.turn)
    }

    /// Returns the color assigned to `player`.
    pub fn color_of(&self, player: &str) -> Option<Color> {
        self.colors.get(player).copied()
    }

    /// Returns the id of the player owning `color`.
    pub fn player(&self, color: Color) -> Option<&PlayerId> {
        self.players.get(&color)
    }

    /// Number of registered players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Returns true when no more players can join.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Returns the winning color once the game is won.
    pub fn winner(&self) -> Option<Color> {
        (self.state == GameState::Won).then_some(self.turn)
    }

    /// Returns the aligned cells that won the game, empty otherwise.
    pub fn winning_run(&self) -> &[Cell] {
        &self.winning_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_player_game() -> Game {
        let mut game = Game::new(7, 6);
        game.add_player("first".to_string()).unwrap();
        game.add_player("second".to_string()).unwrap();
        game
    }

    #[test]
    fn test_second_joiner_moves_first() {
        let mut game = Game::new(7, 6);
        assert_eq!(game.add_player("first".to_string()), Ok(Color::Yellow));
        assert_eq!(game.add_player("second".to_string()), Ok(Color::Red));
        assert_eq!(game.turn(), Color::Red);
        assert_eq!(game.current_player().map(String::as_str), Some("second"));
    }

    #[test]
    fn test_third_player_rejected() {
        let mut game = two_player_game();
        assert_eq!(game.add_player("third".to_string()), Err(MoveError::GameFull));
        assert_eq!(game.player_count(), 2);
        assert_eq!(game.color_of("third"), None);
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let mut game = Game::new(7, 6);
        game.add_player("first".to_string()).unwrap();
        assert_eq!(
            game.add_player("first".to_string()),
            Err(MoveError::AlreadyJoined("first".to_string()))
        );
        assert_eq!(game.player_count(), 1);
    }

    #[test]
    fn test_make_move_reads_col() {
        let mut game = two_player_game();
        assert_eq!(game.make_move("second", &json!({"col": 3})), Ok(Cell::new(3, 0)));
        assert_eq!(game.turn(), Color::Yellow);
    }

    #[test]
    fn test_make_move_rejects_bad_payloads() {
        let mut game = two_player_game();
        for bad in [
            json!({}),
            json!({"col": "3"}),
            json!({"col": 1.5}),
            json!({"col": 3, "row": 0}),
            json!([3]),
            json!(null),
        ] {
            let err = game.make_move("second", &bad).unwrap_err();
            assert!(matches!(err, MoveError::InvalidPayload(_)), "{bad} gave {err:?}");
        }
        assert_eq!(game.turn(), Color::Red);
    }

    #[test]
    fn test_unknown_player_rejected() {
        let mut game = two_player_game();
        assert_eq!(
            game.make_move("stranger", &json!({"col": 0})),
            Err(MoveError::UnknownPlayer("stranger".to_string()))
        );
    }

    #[test]
    fn test_out_of_range_column() {
        let mut game = two_player_game();
        assert_eq!(game.play(Color::Red, 7), Err(MoveError::ColumnOutOfRange(7)));
        assert_eq!(game.play(Color::Red, -1), Err(MoveError::ColumnOutOfRange(-1)));
        assert_eq!(game.turn(), Color::Red);
    }

    #[test]
    fn test_turn_checked_before_range() {
        let mut game = two_player_game();
        assert_eq!(game.play(Color::Yellow, 99), Err(MoveError::NotYourTurn));
    }

    #[test]
    fn test_winner_keeps_turn() {
        let mut game = two_player_game();
        for _ in 0..3 {
            game.play(Color::Red, 0).unwrap();
            game.play(Color::Yellow, 1).unwrap();
        }
        game.play(Color::Red, 0).unwrap();
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.winner(), Some(Color::Red));
        assert_eq!(game.turn(), Color::Red);
        assert_eq!(game.play(Color::Yellow, 1), Err(MoveError::GameOver));
        assert_eq!(game.play(Color::Red, 1), Err(MoveError::GameOver));
    }

    #[test]
    fn test_no_winner_while_running() {
        let game = two_player_game();
        assert_eq!(game.winner(), None);
        assert!(game.winning_run().is_empty());
    }
}
