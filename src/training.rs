//! Batches of games: training runs and evaluation matches.

use crate::agents::{Agent, LearningParams, Mode};
use crate::error::{Error, Result};
use crate::game_controller::{GameController, GameStatus};
use std::fmt;
use tracing::info;

/// Outcome counts over a batch of games, indexed by seat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRecord {
    pub wins_by_seat: Vec<u64>,
    pub draws: u64,
}

impl MatchRecord {
    pub fn new(seats: usize) -> Self {
        Self {
            wins_by_seat: vec![0; seats],
            draws: 0,
        }
    }

    pub fn games(&self) -> u64 {
        self.wins_by_seat.iter().sum::<u64>() + self.draws
    }

    pub fn wins(&self, seat: usize) -> u64 {
        self.wins_by_seat.get(seat).copied().unwrap_or(0)
    }

    /// Games the seat did not win and did not draw.
    pub fn losses(&self, seat: usize) -> u64 {
        self.games() - self.draws - self.wins(seat)
    }

    /// Adds another batch's counts to this one.
    pub fn absorb(&mut self, other: &MatchRecord) {
        if self.wins_by_seat.len() < other.wins_by_seat.len() {
            self.wins_by_seat.resize(other.wins_by_seat.len(), 0);
        }
        for (total, wins) in self.wins_by_seat.iter_mut().zip(&other.wins_by_seat) {
            *total += wins;
        }
        self.draws += other.draws;
    }

    fn record<A: Agent>(&mut self, controller: &GameController<A>, status: GameStatus) {
        match status {
            GameStatus::Win(mark) => {
                if let Some(seat) = controller.agents().iter().position(|a| a.mark() == mark) {
                    self.wins_by_seat[seat] += 1;
                }
            }
            GameStatus::Draw => self.draws += 1,
            GameStatus::InProgress => {}
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} games:", self.games())?;
        for (seat, wins) in self.wins_by_seat.iter().enumerate() {
            write!(f, " seat {} won {},", seat, wins)?;
        }
        write!(f, " {} draws", self.draws)
    }
}

/// Plays `episodes` complete games from the empty board.
///
/// Agents learn from every game in whatever mode they are in. Progress is
/// logged every `log_every` games; zero disables it.
pub fn run_episodes<A: Agent>(
    controller: &mut GameController<A>,
    episodes: usize,
    log_every: usize,
) -> Result<MatchRecord> {
    let mut record = MatchRecord::new(controller.agents().len());
    for episode in 1..=episodes {
        controller.reset();
        let status = controller.play_episode()?;
        record.record(controller, status);
        if log_every > 0 && episode % log_every == 0 {
            info!(
                episode,
                wins = ?record.wins_by_seat,
                draws = record.draws,
                "training progress"
            );
        }
    }
    controller.reset();
    Ok(record)
}

/// Self-play schedule for a learner and a sparring copy of itself.
///
/// Both sides start in `Mode::Learn`. For the refining games the learner
/// switches to `Mode::Play`: it follows its best known line and tries moves it
/// has never made only while that line looks worse than a draw. The sparring
/// partner keeps exploring, so every reply to the learner's line keeps being
/// sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfPlayPlan {
    pub exploring_episodes: usize,
    pub refining_episodes: usize,
    /// Chance of the best known move in `Mode::Learn`, for both sides
    pub greedy_probability: f64,
}

impl Default for SelfPlayPlan {
    fn default() -> Self {
        Self {
            exploring_episodes: 50_000,
            refining_episodes: 25_000,
            greedy_probability: 0.35,
        }
    }
}

impl SelfPlayPlan {
    pub fn total_episodes(&self) -> usize {
        self.exploring_episodes + self.refining_episodes
    }

    /// `base` with this plan's greedy probability.
    pub fn learning_params(&self, base: LearningParams) -> LearningParams {
        LearningParams {
            greedy_probability: self.greedy_probability,
            ..base
        }
    }
}

/// Trains the agent in `learner_seat` against the other seats by `plan`.
///
/// The agents should have been built with [`SelfPlayPlan::learning_params`].
/// Returns the combined record of both stages and leaves the learner in
/// `Mode::Play`.
pub fn self_play<A: Agent>(
    controller: &mut GameController<A>,
    learner_seat: usize,
    plan: &SelfPlayPlan,
    log_every: usize,
) -> Result<MatchRecord> {
    let seats = controller.agents().len();
    if learner_seat >= seats {
        return Err(Error::InvalidConfiguration {
            message: format!("learner seat {} outside {} seats", learner_seat, seats),
        });
    }

    for agent in controller.agents_mut() {
        agent.set_mode(Mode::Learn);
    }
    let mut record = run_episodes(controller, plan.exploring_episodes, log_every)?;
    info!(%record, "exploring stage finished");

    controller.agents_mut()[learner_seat].set_mode(Mode::Play);
    let refining = run_episodes(controller, plan.refining_episodes, log_every)?;
    info!(record = %refining, "refining stage finished");
    record.absorb(&refining);
    Ok(record)
}

/// Switches every agent to `mode` and plays `games` games.
///
/// `Mode::Adaptive` measures pure exploitation; `Mode::Play` also lets the
/// learners try unvisited moves when their best option looks poor.
pub fn evaluate<A: Agent>(
    controller: &mut GameController<A>,
    games: usize,
    mode: Mode,
) -> Result<MatchRecord> {
    for agent in controller.agents_mut() {
        agent.set_mode(mode);
    }
    let record = run_episodes(controller, games, 0)?;
    info!(%mode, %record, "evaluation finished");
    Ok(record)
}
