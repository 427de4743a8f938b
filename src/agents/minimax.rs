use super::Agent;
use crate::error::{Error, Result};
use crate::game::{Mark, StateKey};
use crate::search::PolicyTable;
use std::sync::Arc;

/// Plays the best move recorded in a solved policy table.
///
/// The table is shared and never modified, so any number of agents can read
/// the same one. A state missing from the table means the table was built for
/// a different game, which is reported as [`Error::PolicyMiss`].
#[derive(Clone)]
pub struct MinimaxAgent {
    name: String,
    mark: Mark,
    table: Arc<PolicyTable>,
}

impl MinimaxAgent {
    pub fn new(name: impl Into<String>, mark: Mark, table: Arc<PolicyTable>) -> Self {
        Self {
            name: name.into(),
            mark,
            table,
        }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn mark(&self) -> Mark {
        self.mark
    }

    fn get_estimated_best_move(
        &mut self,
        state: &StateKey,
        available: &[usize],
    ) -> Result<Option<usize>> {
        if available.is_empty() {
            return Ok(None);
        }
        self.table
            .best_move(state)
            .map(Some)
            .ok_or_else(|| Error::PolicyMiss {
                state: state.clone(),
            })
    }
}
