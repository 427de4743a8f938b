//! Board geometry and cell coordinates.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell mark. Players write their winning reward into the cells they take,
/// so the mark doubles as the player's identity on the board.
pub type Mark = i32;

/// Mark of an empty cell.
pub const NEUTRAL: Mark = 0;

/// Game value of a finished game without a winner.
pub const DRAW_VALUE: Mark = 0;

/// Immutable board geometry: rows, columns and the run length needed to win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardConfig {
    num_rows: usize,
    num_cols: usize,
    num_connects_to_win: usize,
}

impl BoardConfig {
    /// Creates a validated board configuration.
    ///
    /// # Arguments
    /// * `num_rows` - Board height, at least 1
    /// * `num_cols` - Board width, at least 1
    /// * `num_connects_to_win` - Run length that wins, between 1 and `max(num_rows, num_cols)`
    pub fn new(num_rows: usize, num_cols: usize, num_connects_to_win: usize) -> Result<Self> {
        if num_rows == 0 || num_cols == 0 {
            return Err(Error::InvalidGeometry {
                message: format!("board must have at least one row and column, got {num_rows}x{num_cols}"),
            });
        }
        if num_connects_to_win == 0 || num_connects_to_win > num_rows.max(num_cols) {
            return Err(Error::InvalidGeometry {
                message: format!(
                    "connect length {} must be between 1 and {} on a {}x{} board",
                    num_connects_to_win,
                    num_rows.max(num_cols),
                    num_rows,
                    num_cols
                ),
            });
        }
        Ok(Self {
            num_rows,
            num_cols,
            num_connects_to_win,
        })
    }

    /// Classic 3x3 tic-tac-toe.
    pub fn tic_tac_toe() -> Self {
        Self {
            num_rows: 3,
            num_cols: 3,
            num_connects_to_win: 3,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_connects_to_win(&self) -> usize {
        self.num_connects_to_win
    }

    pub fn num_cells(&self) -> usize {
        self.num_rows * self.num_cols
    }

    /// Converts a 2d coordinate into a row-major position.
    pub fn position(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.num_rows && col < self.num_cols).then(|| row * self.num_cols + col)
    }

    /// Converts a row-major position back into `(row, col)`.
    pub fn location(&self, position: usize) -> Option<(usize, usize)> {
        (position < self.num_cells()).then(|| (position / self.num_cols, position % self.num_cols))
    }
}

impl fmt::Display for BoardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} connect-{}",
            self.num_rows, self.num_cols, self.num_connects_to_win
        )
    }
}

/// A cell typed by a person, e.g. `"1,2"` for row 1, column 2.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellInput(pub usize, pub usize);

impl CellInput {
    /// Resolves the cell against a board, `None` if it is off the board.
    pub fn to_position(self, config: &BoardConfig) -> Option<usize> {
        config.position(self.0, self.1)
    }
}

impl FromStr for CellInput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err("Expected format: row,col".to_string());
        }
        let r = parts[0].parse::<usize>().map_err(|e| e.to_string())?;
        let c = parts[1].parse::<usize>().map_err(|e| e.to_string())?;
        Ok(CellInput(r, c))
    }
}
