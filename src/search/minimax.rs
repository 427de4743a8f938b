use super::policy::{PolicyEntry, PolicyTable};
use super::{validate_players, SearchDirection};
use crate::error::Result;
use crate::game::{Game, Mark, DRAW_VALUE};
use std::time::Instant;
use tracing::{debug, info};

/// Counters from the most recent build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Non-terminal states solved
    pub nodes_expanded: u64,
    /// Lookups answered from the table instead of re-solving
    pub memo_hits: u64,
    /// Terminal positions reached, counted once per visit
    pub terminal_visits: u64,
}

/// Memoized minimax engine.
///
/// One engine owns one table. Tables built for different geometries or player
/// orders never mix unless the caller explicitly reuses an engine with
/// `fresh = false`.
#[derive(Debug, Default)]
pub struct Minimax {
    table: PolicyTable,
    stats: SearchStats,
}

impl Minimax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solves every state reachable from the current position of `game`.
    ///
    /// # Arguments
    /// * `game` - Position to solve from; restored exactly before returning
    /// * `fresh` - Discard the previous table and counters first
    ///
    /// # Returns
    /// The table, or `AmbiguousReward` if a player's reward equals the draw value
    pub fn get_best_policy(&mut self, game: &mut Game, fresh: bool) -> Result<&PolicyTable> {
        validate_players(game.players())?;
        if fresh {
            self.table.clear();
            self.stats = SearchStats::default();
        }

        let config = *game.config();
        info!(
            board = %config,
            first = %game.current_player(),
            "building minimax policy"
        );
        let start = Instant::now();
        let value = self.search(game)?;
        info!(
            board = %config,
            root_value = value,
            states = self.table.len(),
            nodes = self.stats.nodes_expanded,
            memo_hits = self.stats.memo_hits,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "minimax policy built"
        );
        Ok(&self.table)
    }

    /// Builds a fresh table for `game` and hands ownership to the caller.
    pub fn solve(game: &mut Game) -> Result<PolicyTable> {
        let mut engine = Self::new();
        engine.get_best_policy(game, true)?;
        Ok(engine.into_table())
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    pub fn into_table(self) -> PolicyTable {
        self.table
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    fn search(&mut self, game: &mut Game) -> Result<Mark> {
        if game.is_game_over() {
            self.stats.terminal_visits += 1;
            return Ok(game
                .get_winner()
                .map_or(DRAW_VALUE, |winner| winner.winning_reward()));
        }

        let key = game.state_key();
        if let Some(entry) = self.table.get(&key) {
            self.stats.memo_hits += 1;
            return Ok(entry.value);
        }

        let direction = SearchDirection::for_player(game.current_player(), DRAW_VALUE)?;
        let mut best_value = direction.worst();
        let mut best_move = None;
        for position in game.available_positions() {
            game.make_move(position)?;
            let value = self.search(game);
            game.unmake_move(position)?;
            let value = value?;
            if direction.is_better(value, best_value) {
                best_value = value;
                best_move = Some(position);
            }
        }

        self.stats.nodes_expanded += 1;
        if let Some(best_move) = best_move {
            self.table.insert(
                key,
                PolicyEntry {
                    value: best_value,
                    best_move,
                },
            );
        } else {
            debug!(state = %key, "non-terminal state without moves");
        }
        Ok(best_value)
    }
}
