//! Column-drop board with four-in-a-row detection.

use crate::{Cell, Color, MoveError};
use serde::{Serialize, Serializer};
use tracing::instrument;

/// Number of aligned pieces needed to win.
pub const RUN_LENGTH: usize = 4;

/// Scan directions: horizontal, vertical, rising and falling diagonals.
const AXES: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// A `columns × rows` grid of pieces.
///
/// Pieces stack from row 0 upward, so the occupied cells of every column
/// always form a contiguous run starting at the bottom. Pieces are never
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: usize,
    rows: usize,
    /// Cells stored column-major, each column bottom-up.
    cells: Vec<Vec<Color>>,
}

impl Board {
    /// Creates an empty board.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![vec![Color::Empty; rows]; columns],
        }
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Gets the piece at `cell`, or `None` outside the grid.
    pub fn get(&self, cell: Cell) -> Option<Color> {
        self.cells.get(cell.col)?.get(cell.row).copied()
    }

    /// Returns one column, bottom-up.
    pub fn column(&self, col: usize) -> Option<&[Color]> {
        self.cells.get(col).map(Vec::as_slice)
    }

    /// Checks whether `cell` lies inside the grid.
    pub fn in_range(&self, cell: Cell) -> bool {
        cell.col < self.columns && cell.row < self.rows
    }

    /// Checks whether every cell holds a piece.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|c| !c.is_empty())
    }

    /// Drops a piece into `column`, returning the cell where it landed.
    ///
    /// The caller validates the column range; an out-of-range column is
    /// still rejected rather than panicking.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::ColumnFull`] if the column has no empty row.
    #[instrument(skip(self))]
    pub fn update(&mut self, column: usize, color: Color) -> Result<Cell, MoveError> {
        let slots = self
            .cells
            .get_mut(column)
            .ok_or(MoveError::ColumnOutOfRange(column as i64))?;

        let row = slots
            .iter()
            .position(|c| c.is_empty())
            .ok_or(MoveError::ColumnFull(column))?;

        slots[row] = color;
        Ok(Cell::new(column, row))
    }

    /// Looks for four or more aligned pieces passing through `cell`.
    ///
    /// Only the four axes through the given cell are scanned, so this must
    /// be called with the piece that was just placed. The returned run is
    /// ordered along its axis.
    pub fn find_four(&self, cell: Cell) -> Option<Vec<Cell>> {
        let color = self.get(cell).filter(|c| !c.is_empty())?;

        AXES.iter().find_map(|&(dc, dr)| {
            let mut run = self.walk(cell, color, -dc, -dr);
            run.reverse();
            run.push(cell);
            run.extend(self.walk(cell, color, dc, dr));
            (run.len() >= RUN_LENGTH).then_some(run)
        })
    }

    /// Collects same-colored cells stepping away from `from` (exclusive).
    fn walk(&self, from: Cell, color: Color, dc: isize, dr: isize) -> Vec<Cell> {
        std::iter::successors(from.offset(dc, dr), |c| c.offset(dc, dr))
            .take_while(|&c| self.get(c) == Some(color))
            .collect()
    }

    /// Formats the board top row first, `.` for empty cells.
    pub fn display(&self) -> String {
        (0..self.rows)
            .rev()
            .map(|row| {
                (0..self.columns)
                    .map(|col| match self.cells[col][row] {
                        Color::Empty => '.',
                        Color::Red => 'R',
                        Color::Yellow => 'Y',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.cells.serialize(serializer)
    }
}
