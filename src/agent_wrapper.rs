//! # Agent Wrapper Module - Closed Set of Seatable Agents
//!
//! The game loop, the training runner and the interactive binaries all need
//! to seat any kind of agent without caring which one it is. The set of agents
//! is small and fixed, so instead of boxing trait objects this module wraps
//! them in one enum and forwards every [`Agent`] method with a macro.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────────┐
//! │  GameController │◄──►│   AgentWrapper   │◄──►│  Concrete agents    │
//! │                 │    │                  │    │                     │
//! │ • Turn order    │    │ • Agent trait    │    │ • MinimaxAgent      │
//! │ • Move checks   │    │ • Static dispatch│    │ • MonteCarloAgent   │
//! │ • Reward calls  │    │ • Variant access │    │ • TD / Random /     │
//! └─────────────────┘    └──────────────────┘    │   Human             │
//!                                                └─────────────────────┘
//! ```
//!
//! Variant-specific behaviour (e.g. reading a learning agent's table after
//! training) stays reachable through pattern matching.

use crate::agents::{
    Agent, HumanAgent, MinimaxAgent, Mode, MonteCarloAgent, RandomAgent, TemporalDifferenceAgent,
};
use crate::error::Result;
use crate::game::{Game, Mark, StateKey};
use std::fmt;

/// Any agent the game loop can seat.
pub enum AgentWrapper {
    /// Reads moves from a solved policy table
    Minimax(MinimaxAgent),
    /// Every-visit Monte Carlo learner
    MonteCarlo(MonteCarloAgent),
    /// One-step TD learner
    TemporalDifference(TemporalDifferenceAgent),
    /// Uniform random mover
    Random(RandomAgent),
    /// Moves supplied from outside the loop
    Human(HumanAgent),
}

impl AgentWrapper {
    /// Short label of the variant, used in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentWrapper::Minimax(_) => "minimax",
            AgentWrapper::MonteCarlo(_) => "monte-carlo",
            AgentWrapper::TemporalDifference(_) => "td",
            AgentWrapper::Random(_) => "random",
            AgentWrapper::Human(_) => "human",
        }
    }

    /// True for agents that update a table from experience.
    pub fn is_learning(&self) -> bool {
        matches!(
            self,
            AgentWrapper::MonteCarlo(_) | AgentWrapper::TemporalDifference(_)
        )
    }
}

impl fmt::Display for AgentWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, mark {})", self.name(), self.kind(), self.mark())
    }
}

macro_rules! impl_agent_dispatch {
    ($($variant:ident => $agent:ty),*) => {
        impl Agent for AgentWrapper {
            fn name(&self) -> &str {
                match self {
                    $(AgentWrapper::$variant(a) => a.name(),)*
                }
            }

            fn mark(&self) -> Mark {
                match self {
                    $(AgentWrapper::$variant(a) => a.mark(),)*
                }
            }

            fn evaluate_game_state(&mut self, game: &Game) -> f64 {
                match self {
                    $(AgentWrapper::$variant(a) => a.evaluate_game_state(game),)*
                }
            }

            fn get_estimated_best_move(
                &mut self,
                state: &StateKey,
                available: &[usize],
            ) -> Result<Option<usize>> {
                match self {
                    $(AgentWrapper::$variant(a) => a.get_estimated_best_move(state, available),)*
                }
            }

            fn finish_episode(&mut self, game: &Game) {
                match self {
                    $(AgentWrapper::$variant(a) => a.finish_episode(game),)*
                }
            }

            fn set_mode(&mut self, mode: Mode) {
                match self {
                    $(AgentWrapper::$variant(a) => a.set_mode(mode),)*
                }
            }
        }

        $(
            impl From<$agent> for AgentWrapper {
                fn from(agent: $agent) -> Self {
                    AgentWrapper::$variant(agent)
                }
            }
        )*
    };
}

impl_agent_dispatch!(
    Minimax => MinimaxAgent,
    MonteCarlo => MonteCarloAgent,
    TemporalDifference => TemporalDifferenceAgent,
    Random => RandomAgent,
    Human => HumanAgent
);
