//! One-step temporal-difference control.
//!
//! On every observed transition the agent updates the value of its previous
//! (state, action) pair toward the reward plus the discounted value of the
//! state it now faces:
//!
//! ```text
//! Q(s, a) += learning_rate * (r + discount * V(s') - Q(s, a))
//! V(s')    = max_a' Q(s', a'), or 0 when s' is terminal or unknown
//! ```

use super::experience::{ExperienceTable, SelectionPolicy};
use super::{Agent, LearningParams, Mode, RewardScheme};
use crate::error::Result;
use crate::game::{Game, Mark, StateKey};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::trace;

pub struct TemporalDifferenceAgent {
    name: String,
    mark: Mark,
    mode: Mode,
    params: LearningParams,
    rewards: RewardScheme,
    experiences: ExperienceTable,
    /// The pair waiting for its reward
    last: Option<(StateKey, usize)>,
    rng: Xoshiro256PlusPlus,
}

impl TemporalDifferenceAgent {
    pub fn new(name: impl Into<String>, mark: Mark, seed: u64) -> Self {
        Self {
            name: name.into(),
            mark,
            mode: Mode::default(),
            params: LearningParams::temporal_difference(),
            rewards: RewardScheme::default(),
            experiences: ExperienceTable::new(),
            last: None,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn with_params(mut self, params: LearningParams) -> Result<Self> {
        params.validate()?;
        self.params = params;
        Ok(self)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn experiences(&self) -> &ExperienceTable {
        &self.experiences
    }
}

impl Agent for TemporalDifferenceAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn mark(&self) -> Mark {
        self.mark
    }

    fn evaluate_game_state(&mut self, game: &Game) -> f64 {
        let reward = self.rewards.score(game, self.mark);
        let Some((state, action)) = self.last.take() else {
            return reward;
        };

        let terminal = game.winner_mark().is_some() || game.available_positions().is_empty();
        let next_value = if terminal {
            0.0
        } else {
            self.experiences
                .best_value(&game.state_key())
                .unwrap_or(self.rewards.indeterminate)
        };
        let target = reward + self.params.discount * next_value;
        let value = self.experiences.step_toward(
            &state,
            action,
            target,
            self.params.learning_rate,
            self.rewards.indeterminate,
        );
        trace!(agent = %self.name, action, reward, target, value, "td update");
        reward
    }

    fn get_estimated_best_move(
        &mut self,
        state: &StateKey,
        available: &[usize],
    ) -> Result<Option<usize>> {
        let survey = self.experiences.survey(state, available);
        let policy = SelectionPolicy {
            mode: self.mode,
            greedy_probability: self.params.greedy_probability,
            draw_reward: self.rewards.draw,
            avoid_negative: true,
        };
        let choice = policy.choose(&survey, available, &mut self.rng);
        if let Some((position, _)) = choice {
            self.last = Some((state.clone(), position));
        }
        Ok(choice.map(|(position, _)| position))
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }
}
