//! # Exact Search
//!
//! Exhaustive backward induction over every state reachable from a position.
//! The result is a [`PolicyTable`] mapping each non-terminal state to its
//! game-theoretic value and a best move for the player to move.
//!
//! ## Values and direction
//! A finished game is worth the winner's reward, or [`DRAW_VALUE`] when nobody
//! won. A player whose reward is above the draw value maximizes, a player
//! whose reward is below it minimizes. A reward equal to the draw value leaves
//! the direction undefined and is rejected before any search work happens.
//!
//! ## Tie-breaking
//! Moves are tried in ascending position order and a move only replaces the
//! incumbent when it is strictly better, so the first optimal move wins.

pub mod minimax;
pub mod policy;

pub use minimax::{Minimax, SearchStats};
pub use policy::{PolicyCache, PolicyEntry, PolicyTable};

use crate::error::{Error, Result};
use crate::game::{Mark, Player, DRAW_VALUE};

/// Which way a player pushes the game value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Maximize,
    Minimize,
}

impl SearchDirection {
    /// Derives the direction from a player's reward relative to `draw`.
    pub fn for_player(player: &Player, draw: Mark) -> Result<Self> {
        let reward = player.winning_reward();
        if reward > draw {
            Ok(SearchDirection::Maximize)
        } else if reward < draw {
            Ok(SearchDirection::Minimize)
        } else {
            Err(Error::AmbiguousReward {
                player: player.id().to_string(),
                reward,
            })
        }
    }

    /// Starting value that any real outcome improves on.
    pub fn worst(self) -> Mark {
        match self {
            SearchDirection::Maximize => Mark::MIN,
            SearchDirection::Minimize => Mark::MAX,
        }
    }

    /// Strict comparison: ties never replace the incumbent.
    pub fn is_better(self, candidate: Mark, incumbent: Mark) -> bool {
        match self {
            SearchDirection::Maximize => candidate > incumbent,
            SearchDirection::Minimize => candidate < incumbent,
        }
    }
}

/// Checks every player up front so a bad reward fails before the search starts.
pub(crate) fn validate_players<'a>(players: impl IntoIterator<Item = &'a Player>) -> Result<()> {
    for player in players {
        SearchDirection::for_player(player, DRAW_VALUE)?;
    }
    Ok(())
}
