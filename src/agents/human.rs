use super::Agent;
use crate::error::Result;
use crate::game::{Mark, StateKey};
use parking_lot::Mutex;
use std::sync::Arc;

/// A one-move mailbox filled by whatever reads the person's input.
///
/// Cloning shares the slot, so the input side keeps one handle and the agent
/// the other. A newer submission replaces one that was never taken.
#[derive(Clone, Default)]
pub struct HumanInput {
    pending: Arc<Mutex<Option<usize>>>,
}

impl HumanInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, position: usize) {
        *self.pending.lock() = Some(position);
    }

    pub fn take(&self) -> Option<usize> {
        self.pending.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }
}

/// Relays externally supplied moves.
///
/// Yields `None` while nothing has been submitted. Submitted moves are passed
/// through as-is; the game loop rejects illegal ones.
pub struct HumanAgent {
    name: String,
    mark: Mark,
    input: HumanInput,
}

impl HumanAgent {
    pub fn new(name: impl Into<String>, mark: Mark, input: HumanInput) -> Self {
        Self {
            name: name.into(),
            mark,
            input,
        }
    }

    pub fn input(&self) -> &HumanInput {
        &self.input
    }
}

impl Agent for HumanAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn mark(&self) -> Mark {
        self.mark
    }

    fn get_estimated_best_move(
        &mut self,
        _state: &StateKey,
        _available: &[usize],
    ) -> Result<Option<usize>> {
        Ok(self.input.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relays_submitted_moves_once() {
        let input = HumanInput::new();
        let mut agent = HumanAgent::new("human", -1, input.clone());
        let state = StateKey::from(vec![0; 9]);

        assert_eq!(agent.get_estimated_best_move(&state, &[0, 1]).unwrap(), None);
        input.submit(3);
        input.submit(1);
        assert!(agent.input().is_pending());
        assert_eq!(agent.get_estimated_best_move(&state, &[0, 1]).unwrap(), Some(1));
        assert_eq!(agent.get_estimated_best_move(&state, &[0, 1]).unwrap(), None);
    }
}
