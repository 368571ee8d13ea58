//! Errors raised by the game engine.

/// Broad category of a [`MoveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MoveErrorKind {
    /// Malformed input or unknown participant.
    Validation,
    /// Move is not allowed in the current game state.
    State,
    /// A fixed limit has been reached.
    Capacity,
}

/// Error that can occur when registering a player or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The move payload could not be read.
    #[display("Invalid move payload: {}", _0)]
    InvalidPayload(String),

    /// The player is not registered in this game.
    #[display("Player {} is not part of this game", _0)]
    UnknownPlayer(String),

    /// The player is already registered in this game.
    #[display("Player {} has already joined", _0)]
    AlreadyJoined(String),

    /// The target column lies outside the board.
    #[display("Out of range column {}", _0)]
    ColumnOutOfRange(i64),

    /// The game has already finished.
    #[display("Game is not running")]
    GameOver,

    /// The player tried to move out of turn.
    #[display("Not your turn")]
    NotYourTurn,

    /// The target column has no empty row left.
    #[display("Column {} is full", _0)]
    ColumnFull(usize),

    /// The game already has two players.
    #[display("Game has reached maximum players")]
    GameFull,
}

impl std::error::Error for MoveError {}

impl MoveError {
    /// Returns the category of this error.
    pub fn kind(&self) -> MoveErrorKind {
        match self {
            MoveError::InvalidPayload(_)
            | MoveError::UnknownPlayer(_)
            | MoveError::AlreadyJoined(_)
            | MoveError::ColumnOutOfRange(_) => MoveErrorKind::Validation,
            MoveError::GameOver | MoveError::NotYourTurn => MoveErrorKind::State,
            MoveError::ColumnFull(_) | MoveError::GameFull => MoveErrorKind::Capacity,
        }
    }
}
