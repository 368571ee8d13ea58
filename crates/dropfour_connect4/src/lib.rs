//! Four-in-a-row game logic.
//!
//! Pure, synchronous engine with no I/O: a column-drop [`Board`], the
//! two-player turn machine in [`Game`], and the [`MoveError`] taxonomy the
//! server reports back to players.
//!
//! # Example
//!
//! ```
//! use dropfour_connect4::{Color, Game, GameState};
//!
//! let mut game = Game::new(7, 6);
//! game.add_player("alice".to_string()).unwrap();
//! game.add_player("bob".to_string()).unwrap();
//!
//! // The second player to join plays red, and red opens.
//! assert_eq!(game.current_player().map(String::as_str), Some("bob"));
//! game.play(Color::Red, 3).unwrap();
//! assert_eq!(game.state(), GameState::Running);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod game;
mod types;

pub use board::{Board, RUN_LENGTH};
pub use error::{MoveError, MoveErrorKind};
pub use game::{GAME_NAME, Game, MAX_PLAYERS};
pub use types::{Cell, Color, GameState, PlayerId};
