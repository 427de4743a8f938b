//! # Board and State Model
//!
//! A connect-N game on an R x C grid. Cells are stored row-major
//! (`position = row * num_cols + col`) as small integer marks: `0` for an
//! empty cell and each player's winning reward for the cells they took.
//!
//! ## Move discipline
//! Moves are applied and undone in place with `make_move` / `unmake_move`.
//! Undo follows strict stack order, which is what lets the exhaustive search
//! walk the whole game tree on a single board without copying it.
//!
//! ## Win detection
//! `is_game_over` scans forward (right, down-right, down, down-left) from each
//! played cell so that every line is examined from exactly one end.

pub mod board;
pub mod player;
pub mod state;

pub use board::{BoardConfig, CellInput, Mark, DRAW_VALUE, NEUTRAL};
pub use player::Player;
pub use state::{Game, StateKey};
