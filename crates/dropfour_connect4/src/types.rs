//! Core domain types for four-in-a-row.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player.
pub type PlayerId = String;

/// Piece color, doubling as the turn token.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// No piece.
    #[default]
    Empty,
    /// Red pieces (always moves first).
    Red,
    /// Yellow pieces.
    Yellow,
}

impl Color {
    /// Returns the color that moves after this one.
    ///
    /// Alternates strictly between [`Color::Red`] and [`Color::Yellow`];
    /// never yields [`Color::Empty`].
    pub fn next(self) -> Self {
        match self {
            Color::Red => Color::Yellow,
            Color::Yellow | Color::Empty => Color::Red,
        }
    }

    /// Returns true for an empty cell.
    pub fn is_empty(self) -> bool {
        self == Color::Empty
    }
}

/// A (column, row) coordinate on the board. Row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based column, left to right.
    pub col: usize,
    /// Zero-based row, bottom to top.
    pub row: usize,
}

impl Cell {
    /// Creates a new cell coordinate.
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Offsets the cell by a signed step, returning `None` below zero.
    pub(crate) fn offset(self, dc: isize, dr: isize) -> Option<Self> {
        Some(Self {
            col: self.col.checked_add_signed(dc)?,
            row: self.row.checked_add_signed(dr)?,
        })
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameState {
    /// Game is ongoing.
    Running,
    /// A player completed four in a row.
    Won,
    /// Board filled with no four in a row.
    Drawn,
}

impl GameState {
    /// Returns true once no further moves are accepted.
    pub fn is_terminal(self) -> bool {
        self != GameState::Running
    }
}
