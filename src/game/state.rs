//! The mutable game: cells, turn rotation and win detection.

use super::board::{BoardConfig, Mark, NEUTRAL};
use super::player::Player;
use crate::error::{Error, Result};
use connect_lines::forward_line_owner;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// Owned snapshot of every cell, used as the memoization key.
///
/// Equality and hashing are value based and order sensitive, so two boards
/// with the same marks in the same cells share a key no matter how they were
/// reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Box<[Mark]>);

impl StateKey {
    pub fn cells(&self) -> &[Mark] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[Mark]> for StateKey {
    fn from(cells: &[Mark]) -> Self {
        StateKey(cells.into())
    }
}

impl From<Vec<Mark>> for StateKey {
    fn from(cells: Vec<Mark>) -> Self {
        StateKey(cells.into_boxed_slice())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, mark) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", mark)?;
        }
        write!(f, ")")
    }
}

/// A connect-N game in progress.
///
/// Moves are applied and undone in place. `unmake_move` only accepts the most
/// recent move, which keeps the turn rotation consistent with the undo log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    config: BoardConfig,
    /// Row-major cell marks
    cells: Vec<Mark>,
    /// Empty positions, iterated in ascending order
    available: BTreeSet<usize>,
    /// Undo log of occupied positions, oldest first
    played: Vec<usize>,
    /// Turn order; the front is the player to move
    players: VecDeque<Player>,
    /// Winner mark found by the last `is_game_over` scan
    winner: Option<Mark>,
}

impl Game {
    /// Creates an empty board.
    ///
    /// # Arguments
    /// * `config` - Board geometry
    /// * `players` - Exactly two players with distinct marks, first to move first
    ///
    /// # Returns
    /// `InvalidPlayerCount` or `DuplicateMark` if the players cannot share a board
    pub fn new(config: BoardConfig, players: Vec<Player>) -> Result<Self> {
        if players.len() != 2 {
            return Err(Error::InvalidPlayerCount(players.len()));
        }
        if players[0].winning_reward() == players[1].winning_reward() {
            return Err(Error::DuplicateMark {
                mark: players[0].winning_reward(),
            });
        }
        Ok(Self {
            config,
            cells: vec![NEUTRAL; config.num_cells()],
            available: (0..config.num_cells()).collect(),
            played: Vec::with_capacity(config.num_cells()),
            players: players.into(),
            winner: None,
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn cells(&self) -> &[Mark] {
        &self.cells
    }

    pub fn state_key(&self) -> StateKey {
        StateKey::from(&self.cells[..])
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> &Player {
        &self.players[0]
    }

    /// Players in turn order starting with the player to move.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Empty positions in ascending order.
    pub fn available_moves(&self) -> impl Iterator<Item = usize> + '_ {
        self.available.iter().copied()
    }

    pub fn available_positions(&self) -> Vec<usize> {
        self.available.iter().copied().collect()
    }

    pub fn is_available(&self, position: usize) -> bool {
        self.available.contains(&position)
    }

    /// Occupied positions in the order they were played.
    pub fn played_moves(&self) -> &[usize] {
        &self.played
    }

    /// Writes the current player's mark at `position` and passes the turn.
    pub fn make_move(&mut self, position: usize) -> Result<()> {
        if !self.available.remove(&position) {
            return Err(Error::IllegalMove { position });
        }
        self.cells[position] = self.players[0].winning_reward();
        self.played.push(position);
        self.players.rotate_left(1);
        Ok(())
    }

    /// Exact inverse of `make_move`. Only the most recent move may be undone.
    pub fn unmake_move(&mut self, position: usize) -> Result<()> {
        let last = self.played.last().copied();
        if last != Some(position) {
            return Err(Error::UnmakeOutOfOrder { position, last });
        }
        self.played.pop();
        self.cells[position] = NEUTRAL;
        self.available.insert(position);
        self.players.rotate_right(1);
        self.winner = None;
        Ok(())
    }

    /// Returns true once someone has connected a full line or the board is full.
    ///
    /// Scans forward from every played cell and caches the winner mark. The win
    /// scan runs before the full-board check, so a board-filling winning move
    /// counts as a win. Solvers that test for an empty available set first
    /// would score that same position as a draw.
    pub fn is_game_over(&mut self) -> bool {
        if self.winner.is_some() {
            return true;
        }
        if let Some(mark) = self.scan_for_winner() {
            self.winner = Some(mark);
            return true;
        }
        self.available.is_empty()
    }

    fn scan_for_winner(&self) -> Option<Mark> {
        let cols = self.config.num_cols();
        let rows = self.config.num_rows();
        let line_size = self.config.num_connects_to_win();
        self.played
            .iter()
            .find_map(|&start| forward_line_owner(&self.cells, cols, rows, start, line_size))
    }

    /// Mark of the cached winner, if `is_game_over` found one.
    pub fn winner_mark(&self) -> Option<Mark> {
        self.winner
    }

    /// Resolves the cached winner mark to its player.
    ///
    /// `None` when there is no winner, and also when the mark matches none of
    /// the current players.
    pub fn get_winner(&self) -> Option<&Player> {
        let mark = self.winner?;
        self.players.iter().find(|p| p.winning_reward() == mark)
    }

    /// Unwinds every move, restoring the empty board and the opening turn order.
    pub fn reset(&mut self) {
        while let Some(position) = self.played.pop() {
            self.cells[position] = NEUTRAL;
            self.available.insert(position);
            self.players.rotate_right(1);
        }
        self.winner = None;
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = self.config.num_cols();
        let separator = "----".repeat(cols);
        writeln!(f, "game state: ")?;
        for (r, row) in self.cells.chunks(cols).enumerate() {
            if r > 0 {
                writeln!(f, "{}", separator)?;
            }
            for mark in row {
                write!(f, "|{:^3}|", mark)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
