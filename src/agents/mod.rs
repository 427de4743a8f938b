//! # Decision-Making Agents
//!
//! Every strategy the game loop can seat implements [`Agent`]: it scores the
//! positions it ends up in and picks a move for a state. The loop never looks
//! past that contract.
//!
//! ## Implementations
//! - [`MinimaxAgent`]: reads moves from a solved policy table
//! - [`MonteCarloAgent`]: every-visit Monte Carlo control
//! - [`TemporalDifferenceAgent`]: one-step bootstrapped control
//! - [`RandomAgent`]: uniform over the legal moves
//! - [`HumanAgent`]: relays moves submitted from outside the loop
//!
//! ## Rewards
//! Learning agents score positions relative to their own mark with a
//! [`RewardScheme`]: a win, a loss, a draw, or a game still in progress.

pub mod experience;
pub mod human;
pub mod minimax;
pub mod monte_carlo;
pub mod random;
pub mod temporal_difference;

pub use experience::{ActionSurvey, ExperienceTable};
pub use human::{HumanAgent, HumanInput};
pub use minimax::MinimaxAgent;
pub use monte_carlo::MonteCarloAgent;
pub use random::RandomAgent;
pub use temporal_difference::TemporalDifferenceAgent;

use crate::error::{Error, Result};
use crate::game::{Game, Mark, StateKey};
use std::fmt;

/// How a learning agent balances exploiting what it knows against exploring.
///
/// Modes only change action selection; the learning update is the same in
/// all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Mostly random play, taking the best known move with a small probability
    Learn,
    /// Best known move, but try unvisited moves while the best looks worse than a draw
    Play,
    /// Best known move whenever one exists
    #[default]
    Adaptive,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Learn => "learn",
            Mode::Play => "play",
            Mode::Adaptive => "adaptive",
        };
        write!(f, "{}", name)
    }
}

/// Reward constants for the four kinds of position an agent can end up in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardScheme {
    pub win: f64,
    pub lose: f64,
    pub draw: f64,
    pub indeterminate: f64,
}

impl Default for RewardScheme {
    fn default() -> Self {
        Self {
            win: 10.0,
            lose: -10.0,
            draw: 2.0,
            indeterminate: 0.0,
        }
    }
}

impl RewardScheme {
    /// Scores `game` from the point of view of the player holding `mark`.
    ///
    /// Reads the winner cached by [`Game::is_game_over`], so the caller must
    /// have checked the game after the last move.
    pub fn score(&self, game: &Game, mark: Mark) -> f64 {
        match game.get_winner() {
            Some(winner) if winner.winning_reward() == mark => self.win,
            Some(_) => self.lose,
            None if game.available_positions().is_empty() => self.draw,
            None => self.indeterminate,
        }
    }
}

/// Hyperparameters shared by the learning agents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningParams {
    /// Weight of future rewards, in `[0, 1]`
    pub discount: f64,
    /// Step size of the TD update, in `(0, 1]`; unused by Monte Carlo averaging
    pub learning_rate: f64,
    /// Probability of taking the best known move in `Learn` mode
    pub greedy_probability: f64,
}

impl LearningParams {
    pub fn monte_carlo() -> Self {
        Self {
            discount: 1.0,
            learning_rate: 1.0,
            greedy_probability: 0.2,
        }
    }

    pub fn temporal_difference() -> Self {
        Self {
            discount: 0.6,
            learning_rate: 0.1,
            greedy_probability: 0.2,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.discount) {
            return Err(Error::InvalidConfiguration {
                message: format!("discount must be in [0, 1], got {}", self.discount),
            });
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("learning rate must be in (0, 1], got {}", self.learning_rate),
            });
        }
        if !unit.contains(&self.greedy_probability) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "greedy probability must be in [0, 1], got {}",
                    self.greedy_probability
                ),
            });
        }
        Ok(())
    }
}

/// The capability set the game loop relies on.
pub trait Agent {
    /// Display name used in logs and transcripts.
    fn name(&self) -> &str;

    /// The mark of the seat this agent plays.
    fn mark(&self) -> Mark;

    /// Scores the position the agent's last move led to.
    ///
    /// Called by the game loop right before the agent's next decision. Learning
    /// agents also fold the reward into their experience here.
    fn evaluate_game_state(&mut self, game: &Game) -> f64 {
        RewardScheme::default().score(game, self.mark())
    }

    /// Picks a move for `state` among `available` positions.
    ///
    /// # Returns
    /// `Ok(None)` when there is nothing to play or, for externally driven
    /// agents, when no move has been supplied yet
    fn get_estimated_best_move(
        &mut self,
        state: &StateKey,
        available: &[usize],
    ) -> Result<Option<usize>>;

    /// Called once for every seat when a game ends.
    fn finish_episode(&mut self, game: &Game) {
        self.evaluate_game_state(game);
    }

    /// Switches exploration behaviour. Agents without one ignore it.
    fn set_mode(&mut self, _mode: Mode) {}
}
