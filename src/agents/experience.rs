//! Action-value storage and the exploration rule shared by the learning agents.

use super::Mode;
use crate::game::StateKey;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;

/// What an agent knows about one (state, action) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Experience {
    /// Estimated value, `None` until the first update lands
    pub value: Option<f64>,
    /// Times the action was taken from the state
    pub visits: u32,
}

/// Per-state partition of the legal moves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionSurvey {
    /// Highest valued known move; the first one enumerated wins ties
    pub best: Option<(usize, f64)>,
    /// Moves without a value yet
    pub unvisited: Vec<usize>,
    /// Known moves whose value is below zero
    pub negative: Vec<usize>,
}

/// Action values and visit counts, grown by the owning agent only.
#[derive(Debug, Clone, Default)]
pub struct ExperienceTable {
    entries: HashMap<StateKey, HashMap<usize, Experience>>,
}

impl ExperienceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: &StateKey, action: usize) -> Option<&Experience> {
        self.entries.get(state)?.get(&action)
    }

    pub fn value(&self, state: &StateKey, action: usize) -> Option<f64> {
        self.get(state, action)?.value
    }

    pub fn visits(&self, state: &StateKey, action: usize) -> u32 {
        self.get(state, action).map_or(0, |e| e.visits)
    }

    /// Largest known value over every action from `state`.
    pub fn best_value(&self, state: &StateKey) -> Option<f64> {
        self.entries
            .get(state)?
            .values()
            .filter_map(|e| e.value)
            .reduce(f64::max)
    }

    /// Number of states with at least one recorded action.
    pub fn num_states(&self) -> usize {
        self.entries.len()
    }

    pub fn states(&self) -> impl Iterator<Item = &StateKey> {
        self.entries.keys()
    }

    /// Number of (state, action) pairs that carry a value.
    pub fn num_values(&self) -> usize {
        self.entries
            .values()
            .flat_map(|actions| actions.values())
            .filter(|e| e.value.is_some())
            .count()
    }

    fn entry(&mut self, state: &StateKey, action: usize) -> &mut Experience {
        self.entries
            .entry(state.clone())
            .or_default()
            .entry(action)
            .or_default()
    }

    /// Counts one more visit and returns the new count.
    pub fn record_visit(&mut self, state: &StateKey, action: usize) -> u32 {
        let experience = self.entry(state, action);
        experience.visits += 1;
        experience.visits
    }

    /// Incremental mean: `v += (target - v) / visits`, starting from zero.
    pub fn average_in(&mut self, state: &StateKey, action: usize, target: f64) -> f64 {
        let experience = self.entry(state, action);
        let old = experience.value.unwrap_or(0.0);
        let visits = experience.visits.max(1) as f64;
        let new = old + (target - old) / visits;
        experience.value = Some(new);
        new
    }

    /// Constant step update: `v += step * (target - v)`, starting from `initial`.
    pub fn step_toward(
        &mut self,
        state: &StateKey,
        action: usize,
        target: f64,
        step: f64,
        initial: f64,
    ) -> f64 {
        let experience = self.entry(state, action);
        let old = experience.value.unwrap_or(initial);
        let new = old + step * (target - old);
        experience.value = Some(new);
        new
    }

    /// Partitions `available` by what the table knows about each move.
    pub fn survey(&self, state: &StateKey, available: &[usize]) -> ActionSurvey {
        let actions = self.entries.get(state);
        let mut survey = ActionSurvey::default();
        for &position in available {
            match actions.and_then(|a| a.get(&position)).and_then(|e| e.value) {
                Some(value) => {
                    if survey.best.map_or(true, |(_, best)| value > best) {
                        survey.best = Some((position, value));
                    }
                    if value < 0.0 {
                        survey.negative.push(position);
                    }
                }
                None => survey.unvisited.push(position),
            }
        }
        survey
    }
}

/// Why a move was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceReason {
    /// The best known move
    Best,
    /// Uniform over unvisited moves because the best known one looked poor
    Explore,
    /// Uniform over the (possibly narrowed) legal moves
    Random,
}

/// The mode-dependent choice between the best known move and exploration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SelectionPolicy {
    pub mode: Mode,
    pub greedy_probability: f64,
    /// Known values below this trigger exploration in `Play` mode
    pub draw_reward: f64,
    /// Leave known-negative moves out of random fallbacks when others remain
    pub avoid_negative: bool,
}

impl SelectionPolicy {
    pub fn choose<R: Rng>(
        &self,
        survey: &ActionSurvey,
        available: &[usize],
        rng: &mut R,
    ) -> Option<(usize, ChoiceReason)> {
        if let Some((best, value)) = survey.best {
            match self.mode {
                Mode::Learn => {
                    if rng.random::<f64>() < self.greedy_probability {
                        return Some((best, ChoiceReason::Best));
                    }
                }
                Mode::Play => {
                    if value < self.draw_reward && !survey.unvisited.is_empty() {
                        return survey
                            .unvisited
                            .choose(rng)
                            .map(|&p| (p, ChoiceReason::Explore));
                    }
                    return Some((best, ChoiceReason::Best));
                }
                Mode::Adaptive => return Some((best, ChoiceReason::Best)),
            }
        }

        if self.avoid_negative && survey.negative.len() < available.len() {
            let candidates: Vec<usize> = available
                .iter()
                .copied()
                .filter(|p| !survey.negative.contains(p))
                .collect();
            return candidates.choose(rng).map(|&p| (p, ChoiceReason::Random));
        }
        available.choose(rng).map(|&p| (p, ChoiceReason::Random))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn key() -> StateKey {
        StateKey::from(&[0, 0, 0, 0][..])
    }

    #[test]
    fn running_average_matches_mean() {
        let mut table = ExperienceTable::new();
        let state = key();
        for target in [10.0, -10.0, 2.0, 0.0] {
            table.record_visit(&state, 1);
            table.average_in(&state, 1, target);
        }
        assert_eq!(table.visits(&state, 1), 4);
        assert!((table.value(&state, 1).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn step_update_moves_toward_target() {
        let mut table = ExperienceTable::new();
        let state = key();
        let v = table.step_toward(&state, 2, 10.0, 0.1, 0.0);
        assert!((v - 1.0).abs() < 1e-12);
        let v = table.step_toward(&state, 2, 10.0, 0.1, 0.0);
        assert!((v - 1.9).abs() < 1e-12);
        assert_eq!(table.visits(&state, 2), 0);
        assert_eq!(table.best_value(&state), Some(v));
    }

    #[test]
    fn survey_partitions_moves() {
        let mut table = ExperienceTable::new();
        let state = key();
        table.step_toward(&state, 0, -4.0, 1.0, 0.0);
        table.step_toward(&state, 1, 3.0, 1.0, 0.0);
        table.step_toward(&state, 2, 3.0, 1.0, 0.0);
        // visited but not yet valued
        table.record_visit(&state, 3);

        let survey = table.survey(&state, &[0, 1, 2, 3]);
        assert_eq!(survey.best, Some((1, 3.0)));
        assert_eq!(survey.unvisited, vec![3]);
        assert_eq!(survey.negative, vec![0]);
        assert_eq!(table.num_values(), 3);
        assert_eq!(table.num_states(), 1);
    }

    #[test]
    fn mode_rules() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let poor = ActionSurvey {
            best: Some((0, -4.0)),
            unvisited: vec![2, 3],
            negative: vec![0],
        };
        let mut policy = SelectionPolicy {
            mode: Mode::Adaptive,
            greedy_probability: 0.2,
            draw_reward: 2.0,
            avoid_negative: false,
        };
        assert_eq!(
            policy.choose(&poor, &[0, 2, 3], &mut rng),
            Some((0, ChoiceReason::Best))
        );

        policy.mode = Mode::Play;
        for _ in 0..20 {
            let (p, reason) = policy.choose(&poor, &[0, 2, 3], &mut rng).unwrap();
            assert_eq!(reason, ChoiceReason::Explore);
            assert!(p == 2 || p == 3);
        }

        let good = ActionSurvey {
            best: Some((1, 5.0)),
            unvisited: vec![2],
            negative: vec![],
        };
        assert_eq!(
            policy.choose(&good, &[1, 2], &mut rng),
            Some((1, ChoiceReason::Best))
        );

        policy.mode = Mode::Learn;
        policy.greedy_probability = 1.0;
        assert_eq!(
            policy.choose(&poor, &[0, 2, 3], &mut rng),
            Some((0, ChoiceReason::Best))
        );
        policy.greedy_probability = 0.0;
        policy.avoid_negative = true;
        for _ in 0..20 {
            let (p, reason) = policy.choose(&poor, &[0, 2, 3], &mut rng).unwrap();
            assert_eq!(reason, ChoiceReason::Random);
            assert_ne!(p, 0);
        }
    }

    #[test]
    fn nothing_to_choose() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let policy = SelectionPolicy {
            mode: Mode::Learn,
            greedy_probability: 0.2,
            draw_reward: 2.0,
            avoid_negative: true,
        };
        assert_eq!(policy.choose(&ActionSurvey::default(), &[], &mut rng), None);
    }
}
