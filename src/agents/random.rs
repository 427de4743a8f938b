use super::Agent;
use crate::error::Result;
use crate::game::{Mark, StateKey};
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Picks uniformly among the legal moves.
pub struct RandomAgent {
    name: String,
    mark: Mark,
    rng: Xoshiro256PlusPlus,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>, mark: Mark, seed: u64) -> Self {
        Self {
            name: name.into(),
            mark,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn mark(&self) -> Mark {
        self.mark
    }

    fn get_estimated_best_move(
        &mut self,
        _state: &StateKey,
        available: &[usize],
    ) -> Result<Option<usize>> {
        Ok(available.choose(&mut self.rng).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn picks_only_available_moves() {
        let mut agent = RandomAgent::new("random", 1, 42);
        let state = StateKey::from(vec![0; 9]);
        let available = [1, 5, 7];
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let mv = agent
                .get_estimated_best_move(&state, &available)
                .unwrap()
                .unwrap();
            assert!(available.contains(&mv));
            seen.insert(mv);
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(agent.get_estimated_best_move(&state, &[]).unwrap(), None);
    }

    #[test]
    fn same_seed_same_moves() {
        let state = StateKey::from(vec![0; 9]);
        let available: Vec<usize> = (0..9).collect();
        let mut a = RandomAgent::new("a", 1, 9);
        let mut b = RandomAgent::new("b", 1, 9);
        for _ in 0..20 {
            assert_eq!(
                a.get_estimated_best_move(&state, &available).unwrap(),
                b.get_estimated_best_move(&state, &available).unwrap()
            );
        }
    }
}
