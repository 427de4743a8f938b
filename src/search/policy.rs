//! Solved policy tables and a per-configuration cache of them.

use super::minimax::Minimax;
use crate::error::{Error, Result};
use crate::game::{BoardConfig, Game, Mark, Player, StateKey};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

/// Value of a state under optimal play and the move that achieves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEntry {
    pub value: Mark,
    pub best_move: usize,
}

/// Mapping from state to its solved entry.
///
/// Only the search writes to a table; everything else reads it.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: HashMap<StateKey, PolicyEntry>,
}

impl PolicyTable {
    pub fn get(&self, state: &StateKey) -> Option<&PolicyEntry> {
        self.entries.get(state)
    }

    pub fn best_move(&self, state: &StateKey) -> Option<usize> {
        self.entries.get(state).map(|entry| entry.best_move)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &PolicyEntry)> {
        self.entries.iter()
    }

    pub(crate) fn insert(&mut self, state: StateKey, entry: PolicyEntry) {
        self.entries.insert(state, entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes one line per state, sorted by state so dumps are diffable.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut states: Vec<_> = self.entries.iter().collect();
        states.sort_by(|a, b| a.0.cmp(b.0));
        for (state, entry) in states {
            writeln!(
                writer,
                "state is {}, best move is {}, best value is {}",
                state, entry.best_move, entry.value
            )
            .map_err(|e| Error::io("write policy table", e))?;
        }
        Ok(())
    }
}

/// Solved tables keyed by geometry and the ordered player rewards.
///
/// Each distinct configuration is searched once; later requests share the
/// table through an `Arc`.
#[derive(Default)]
pub struct PolicyCache {
    tables: Mutex<HashMap<(BoardConfig, Vec<Mark>), Arc<PolicyTable>>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for `config` with `players` in turn order, building it
    /// on first use.
    pub fn get_or_build(&self, config: BoardConfig, players: &[Player]) -> Result<Arc<PolicyTable>> {
        let key = (
            config,
            players.iter().map(|p| p.winning_reward()).collect::<Vec<_>>(),
        );
        if let Some(table) = self.tables.lock().get(&key) {
            return Ok(Arc::clone(table));
        }

        // Solve without holding the lock; the first finished table is kept.
        let mut game = Game::new(config, players.to_vec())?;
        let table = Arc::new(Minimax::solve(&mut game)?);
        let mut tables = self.tables.lock();
        Ok(Arc::clone(tables.entry(key).or_insert(table)))
    }

    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_format() {
        let mut table = PolicyTable::default();
        table.insert(
            StateKey::from(&[1, 0, 0, 0][..]),
            PolicyEntry {
                value: -1,
                best_move: 3,
            },
        );
        table.insert(
            StateKey::from(&[0, 0, 0, 0][..]),
            PolicyEntry {
                value: 1,
                best_move: 0,
            },
        );
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "state is (0, 0, 0, 0), best move is 0, best value is 1\n\
             state is (1, 0, 0, 0), best move is 3, best value is -1\n"
        );
    }

    #[test]
    fn cache_builds_each_configuration_once() {
        let cache = PolicyCache::new();
        let config = BoardConfig::new(2, 2, 2).unwrap();
        let players = [Player::new("X", 1), Player::new("O", -1)];

        let first = cache.get_or_build(config, &players).unwrap();
        let second = cache.get_or_build(config, &players).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let swapped = [Player::new("O", -1), Player::new("X", 1)];
        let third = cache.get_or_build(config, &swapped).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.len(), 2);
    }
}
