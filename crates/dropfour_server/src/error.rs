//! Room and registry error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dropfour_connect4::{MoveError, MoveErrorKind};
use tracing::debug;

/// Category of a [`RoomError`], used to decide who hears about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed move, column or player id.
    Validation,
    /// Out of turn, or the game is over.
    State,
    /// Room or column is full.
    Capacity,
    /// Room missing, or its name is taken.
    Lookup,
    /// A player connection failed.
    Transport,
}

impl From<MoveErrorKind> for ErrorKind {
    fn from(kind: MoveErrorKind) -> Self {
        match kind {
            MoveErrorKind::Validation => ErrorKind::Validation,
            MoveErrorKind::State => ErrorKind::State,
            MoveErrorKind::Capacity => ErrorKind::Capacity,
        }
    }
}

/// Error raised by a room, the registry or the transport around them.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RoomError {
    /// The game engine rejected the operation.
    #[display("{}", _0)]
    Move(MoveError),

    /// No room is registered under this name.
    #[display("Room '{}' does not exist", _0)]
    RoomNotFound(String),

    /// A room is already registered under this name.
    #[display("Room '{}' already exists", _0)]
    RoomExists(String),

    /// Room names must not be empty.
    #[display("Room name must not be empty")]
    InvalidName,

    /// The player id is not a UUID.
    #[display("Invalid player id '{}'", _0)]
    InvalidPlayerId(String),

    /// The room's run loop was already started.
    #[display("Room '{}' is already running", _0)]
    AlreadyStarted(String),

    /// A player connection failed or closed.
    #[display("Connection failed: {}", _0)]
    Transport(String),
}

impl std::error::Error for RoomError {}

impl From<MoveError> for RoomError {
    fn from(err: MoveError) -> Self {
        RoomError::Move(err)
    }
}

impl RoomError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::Move(err) => err.kind().into(),
            RoomError::InvalidName | RoomError::InvalidPlayerId(_) => ErrorKind::Validation,
            RoomError::AlreadyStarted(_) => ErrorKind::State,
            RoomError::RoomNotFound(_) | RoomError::RoomExists(_) => ErrorKind::Lookup,
            RoomError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Lookup => StatusCode::BAD_REQUEST,
            ErrorKind::State | ErrorKind::Capacity => StatusCode::CONFLICT,
            ErrorKind::Transport => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RoomError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(%status, kind = %self.kind(), error = %self, "Request rejected");
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_keep_their_kind() {
        assert_eq!(RoomError::from(MoveError::GameFull).kind(), ErrorKind::Capacity);
        assert_eq!(RoomError::from(MoveError::NotYourTurn).kind(), ErrorKind::State);
        assert_eq!(
            RoomError::from(MoveError::ColumnOutOfRange(9)).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_lookup_errors_are_bad_requests() {
        assert_eq!(
            RoomError::RoomNotFound("r1".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RoomError::RoomExists("r1".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RoomError::from(MoveError::GameFull).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_move_error_message_passes_through() {
        assert_eq!(
            RoomError::from(MoveError::ColumnFull(2)).to_string(),
            "Column 2 is full"
        );
    }

    #[test]
    fn test_kind_displays_lowercase() {
        assert_eq!(ErrorKind::Lookup.to_string(), "lookup");
        assert_eq!(
            RoomError::Transport("gone".to_string()).kind().to_string(),
            "transport"
        );
    }
}
