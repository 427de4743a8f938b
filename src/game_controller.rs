//! # Game Controller Module - The Game Loop
//!
//! This module provides the `GameController`, which owns the authoritative
//! game and the agents seated at it. It asks the agent whose turn it is for a
//! move, validates and applies that move, and tells every agent how the game
//! went.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       GameController                                │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │              Authoritative Game                             │    │
//! │  │  • All moves validated here before application              │    │
//! │  │  • Move history maintained                                  │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │                           │                                         │
//! │              ┌────────────┴────────────┐                            │
//! │              ▼                         ▼                            │
//! │  ┌──────────────────────┐  ┌──────────────────────────────┐         │
//! │  │ Seat 0 agent         │  │ Seat 1 agent                 │         │
//! │  │ evaluate → decide    │  │ evaluate → decide            │         │
//! │  └──────────────────────┘  └──────────────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reward hand-off
//! Right before an agent decides, the controller lets it score the position
//! its previous move led to (`evaluate_game_state`). When the game ends every
//! agent gets `finish_episode` exactly once.
//!
//! ## Illegal moves
//! A rejected move is logged, reported as [`MoveResult::Invalid`], and the
//! game continues with the same player to move.

use crate::agent_wrapper::AgentWrapper;
use crate::agents::Agent;
use crate::error::{Error, Result};
use crate::game::{Game, Mark};
use std::fmt::Write as _;
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{trace, warn};

/// How long `play_episode` sleeps while an agent has no move ready.
const WAIT_INTERVAL: Duration = Duration::from_millis(10);

/// Result of asking for or attempting a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        /// The applied position
        position: usize,
        /// Mark of the player who made the move
        player: Mark,
        /// Whether the game is now over
        game_over: bool,
        /// Winner mark if the game is over (None for draw or in progress)
        winner: Option<Mark>,
    },
    /// Move was rejected; the same player is still to move
    Invalid {
        position: usize,
        player: Mark,
        reason: MoveValidationError,
    },
    /// The agent to move has no move ready yet
    Waiting { player: Mark },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// Reasons a move can be rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveValidationError {
    /// The cell already holds a mark
    Occupied,
    /// The position is not on the board
    OffBoard,
}

impl std::fmt::Display for MoveValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveValidationError::Occupied => write!(f, "cell is already occupied"),
            MoveValidationError::OffBoard => write!(f, "position is not on the board"),
        }
    }
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Mark of the player who made the move
    pub player: Mark,
    /// Row-major position of the move
    pub position: usize,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(player: Mark, position: usize, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            position,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Game is still in progress
    InProgress,
    /// Game ended with a winner
    Win(Mark),
    /// Game ended in a draw
    Draw,
}

impl GameStatus {
    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// The game loop: one game, one agent per seat.
///
/// # Usage
/// ```rust,ignore
/// let mut controller = GameController::new(game, vec![first.into(), second.into()])?;
/// match controller.step()? {
///     MoveResult::Success { game_over, winner, .. } => { /* applied */ }
///     MoveResult::Invalid { reason, .. } => { /* dropped, same player again */ }
///     MoveResult::Waiting { .. } => { /* human has not answered yet */ }
///     MoveResult::GameOver => { /* nothing left to play */ }
/// }
/// ```
pub struct GameController<A: Agent = AgentWrapper> {
    /// The authoritative game
    game: Game,
    /// Agents in seat order, one per player
    agents: Vec<A>,
    /// Seats whose last move has not been scored yet
    awaiting_reward: Vec<bool>,
    /// Complete history of moves made
    move_history: Vec<MoveHistoryEntry>,
    /// Current game status
    status: GameStatus,
}

impl<A: Agent> GameController<A> {
    /// Seats `agents` at `game`.
    ///
    /// Every player of the game needs exactly one agent carrying its mark.
    pub fn new(mut game: Game, agents: Vec<A>) -> Result<Self> {
        let marks: Vec<Mark> = game.players().map(|p| p.winning_reward()).collect();
        if agents.len() != marks.len() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "{} agents for a game of {} players",
                    agents.len(),
                    marks.len()
                ),
            });
        }
        for mark in &marks {
            let seated = agents.iter().filter(|a| a.mark() == *mark).count();
            if seated != 1 {
                return Err(Error::InvalidConfiguration {
                    message: format!("mark {} is played by {} agents, expected 1", mark, seated),
                });
            }
        }

        let status = Self::status_of(&mut game);
        Ok(Self {
            awaiting_reward: vec![false; agents.len()],
            game,
            agents,
            move_history: Vec::new(),
            status,
        })
    }

    fn status_of(game: &mut Game) -> GameStatus {
        if !game.is_game_over() {
            GameStatus::InProgress
        } else {
            match game.winner_mark() {
                Some(mark) => GameStatus::Win(mark),
                None => GameStatus::Draw,
            }
        }
    }

    fn seat_of(&self, mark: Mark) -> Result<usize> {
        self.agents
            .iter()
            .position(|a| a.mark() == mark)
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!("no agent plays mark {}", mark),
            })
    }

    /// Asks the agent whose turn it is for a move and applies it.
    pub fn step(&mut self) -> Result<MoveResult> {
        if self.status.is_game_over() {
            return Ok(MoveResult::GameOver);
        }
        let player = self.game.current_player().winning_reward();
        let seat = self.seat_of(player)?;

        if self.awaiting_reward[seat] {
            self.agents[seat].evaluate_game_state(&self.game);
            self.awaiting_reward[seat] = false;
        }

        let state = self.game.state_key();
        let available = self.game.available_positions();
        let Some(position) = self.agents[seat].get_estimated_best_move(&state, &available)? else {
            return Ok(MoveResult::Waiting { player });
        };

        let result = self.try_make_move(position)?;
        if let MoveResult::Success { game_over: false, .. } = result {
            self.awaiting_reward[seat] = true;
        }
        Ok(result)
    }

    /// Validates and applies a move for the player to move.
    ///
    /// Moves made here bypass the agent, so the seat is not owed a reward for
    /// them. Used for scripted openings.
    pub fn try_make_move(&mut self, position: usize) -> Result<MoveResult> {
        if self.status.is_game_over() {
            return Ok(MoveResult::GameOver);
        }
        let player = self.game.current_player().winning_reward();

        if let Err(e) = self.game.make_move(position) {
            if !e.is_recoverable() {
                return Err(e);
            }
            let reason = if position < self.game.config().num_cells() {
                MoveValidationError::Occupied
            } else {
                MoveValidationError::OffBoard
            };
            warn!(player, position, %reason, error = %e, "rejected illegal move");
            return Ok(MoveResult::Invalid {
                position,
                player,
                reason,
            });
        }

        let move_number = self.move_history.len() + 1;
        self.move_history
            .push(MoveHistoryEntry::new(player, position, move_number));
        trace!(player, position, move_number, "move applied");

        self.status = Self::status_of(&mut self.game);
        let game_over = self.status.is_game_over();
        if game_over {
            self.finish_episode();
        }
        Ok(MoveResult::Success {
            position,
            player,
            game_over,
            winner: self.get_winner(),
        })
    }

    fn finish_episode(&mut self) {
        for agent in &mut self.agents {
            agent.finish_episode(&self.game);
        }
        self.awaiting_reward.iter_mut().for_each(|owed| *owed = false);
    }

    /// Steps until the game ends, waiting while an agent has no move ready.
    pub fn play_episode(&mut self) -> Result<GameStatus> {
        loop {
            match self.step()? {
                MoveResult::GameOver => return Ok(self.status),
                MoveResult::Success { game_over: true, .. } => return Ok(self.status),
                MoveResult::Waiting { .. } => thread::sleep(WAIT_INTERVAL),
                MoveResult::Success { .. } | MoveResult::Invalid { .. } => {}
            }
        }
    }

    /// Clears the board for a new game with the same agents.
    ///
    /// A game abandoned before its end is closed with `finish_episode` on the
    /// position reached, so learning agents never carry a half episode over.
    pub fn reset(&mut self) {
        if !self.status.is_game_over() && !self.move_history.is_empty() {
            self.finish_episode();
        }
        self.game.reset();
        self.move_history.clear();
        self.awaiting_reward.iter_mut().for_each(|owed| *owed = false);
        self.status = Self::status_of(&mut self.game);
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [A] {
        &mut self.agents
    }

    pub fn into_agents(self) -> Vec<A> {
        self.agents
    }

    /// The agent whose turn it is.
    pub fn current_agent(&self) -> Option<&A> {
        let mark = self.game.current_player().winning_reward();
        self.agents.iter().find(|a| a.mark() == mark)
    }

    /// Get the current game status
    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Get the winner mark if the game is over
    pub fn get_winner(&self) -> Option<Mark> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    /// Get the complete move history
    pub fn move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    pub fn last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    fn player_name(&self, mark: Mark) -> String {
        self.agents
            .iter()
            .find(|a| a.mark() == mark)
            .map_or_else(|| format!("Player {}", mark), |a| a.name().to_string())
    }

    /// Formats the move history as plain text, one move per line.
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let config = self.game.config();
        let mut output = format!("=== {} Game History ===\n\n", config);
        for entry in &self.move_history {
            let (row, col) = config.location(entry.position).unwrap_or((0, 0));
            let _ = writeln!(
                output,
                "{}. {} - ({},{})",
                entry.move_number,
                self.player_name(entry.player),
                row,
                col
            );
        }

        let _ = match self.status {
            GameStatus::Win(winner) => {
                writeln!(output, "\nResult: {} wins!", self.player_name(winner))
            }
            GameStatus::Draw => writeln!(output, "\nResult: Draw"),
            GameStatus::InProgress => writeln!(
                output,
                "\n(Game in progress - {} to move)",
                self.player_name(self.game.current_player().winning_reward())
            ),
        };
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{HumanAgent, HumanInput, MonteCarloAgent, RandomAgent};
    use crate::game::{BoardConfig, Player};

    fn game() -> Game {
        Game::new(
            BoardConfig::tic_tac_toe(),
            vec![Player::new("X", 1), Player::new("O", -1)],
        )
        .unwrap()
    }

    fn humans() -> (GameController, HumanInput, HumanInput) {
        let x = HumanInput::new();
        let o = HumanInput::new();
        let controller = GameController::new(
            game(),
            vec![
                HumanAgent::new("Xavier", 1, x.clone()).into(),
                HumanAgent::new("Olga", -1, o.clone()).into(),
            ],
        )
        .unwrap();
        (controller, x, o)
    }

    #[test]
    fn test_valid_move() {
        let (mut controller, x, _) = humans();
        x.submit(4);
        match controller.step().unwrap() {
            MoveResult::Success {
                position,
                player,
                game_over,
                ..
            } => {
                assert_eq!(position, 4);
                assert_eq!(player, 1);
                assert!(!game_over);
            }
            other => panic!("Expected successful move, got {:?}", other),
        }
        assert_eq!(controller.current_agent().map(|a| a.name()), Some("Olga"));
    }

    #[test]
    fn test_invalid_move_occupied() {
        let (mut controller, x, o) = humans();
        x.submit(4);
        controller.step().unwrap();
        o.submit(4);
        assert_eq!(
            controller.step().unwrap(),
            MoveResult::Invalid {
                position: 4,
                player: -1,
                reason: MoveValidationError::Occupied
            }
        );
        o.submit(12);
        assert!(matches!(
            controller.step().unwrap(),
            MoveResult::Invalid {
                reason: MoveValidationError::OffBoard,
                ..
            }
        ));
        // Still O to move after rejected moves.
        o.submit(0);
        assert!(matches!(
            controller.step().unwrap(),
            MoveResult::Success { player: -1, .. }
        ));
    }

    #[test]
    fn waiting_for_input() {
        let (mut controller, _, _) = humans();
        assert_eq!(
            controller.step().unwrap(),
            MoveResult::Waiting { player: 1 }
        );
        assert_eq!(controller.move_count(), 0);
    }

    #[test]
    fn test_move_history_and_result() {
        let (mut controller, x, o) = humans();
        for (input, pos) in [(&x, 0), (&o, 3), (&x, 1), (&o, 4), (&x, 2)] {
            input.submit(pos);
            controller.step().unwrap();
        }
        assert_eq!(controller.status(), GameStatus::Win(1));
        assert_eq!(controller.get_winner(), Some(1));
        assert_eq!(controller.move_count(), 5);
        assert_eq!(controller.move_history()[1].player, -1);
        assert_eq!(controller.step().unwrap(), MoveResult::GameOver);

        let history = controller.format_history();
        assert!(history.contains("3x3 connect-3 Game History"));
        assert!(history.contains("1. Xavier - (0,0)"));
        assert!(history.contains("2. Olga - (1,0)"));
        assert!(history.contains("Result: Xavier wins!"));
    }

    #[test]
    fn test_reset() {
        let (mut controller, x, _) = humans();
        x.submit(4);
        controller.step().unwrap();
        controller.reset();
        assert_eq!(controller.move_count(), 0);
        assert_eq!(controller.status(), GameStatus::InProgress);
        assert!(controller.game().played_moves().is_empty());
        assert_eq!(controller.format_history(), "No moves made yet.");
    }

    #[test]
    fn scripted_illegal_moves_are_rejected_without_error() {
        let (mut controller, _, _) = humans();
        assert!(matches!(
            controller.try_make_move(4).unwrap(),
            MoveResult::Success { player: 1, .. }
        ));
        assert_eq!(
            controller.try_make_move(4).unwrap(),
            MoveResult::Invalid {
                position: 4,
                player: -1,
                reason: MoveValidationError::Occupied
            }
        );
        assert_eq!(
            controller.try_make_move(99).unwrap(),
            MoveResult::Invalid {
                position: 99,
                player: -1,
                reason: MoveValidationError::OffBoard
            }
        );
        assert_eq!(controller.move_count(), 1);
        assert_eq!(controller.status(), GameStatus::InProgress);
    }

    #[test]
    fn rejects_mismatched_seats() {
        let agents: Vec<AgentWrapper> = vec![
            RandomAgent::new("a", 1, 0).into(),
            RandomAgent::new("b", 1, 1).into(),
        ];
        assert!(matches!(
            GameController::new(game(), agents),
            Err(Error::InvalidConfiguration { .. })
        ));
        let agents: Vec<AgentWrapper> = vec![RandomAgent::new("a", 1, 0).into()];
        assert!(GameController::new(game(), agents).is_err());
    }

    #[test]
    fn random_games_always_finish() {
        let agents: Vec<AgentWrapper> = vec![
            RandomAgent::new("a", 1, 10).into(),
            RandomAgent::new("b", -1, 20).into(),
        ];
        let mut controller = GameController::new(game(), agents).unwrap();
        for _ in 0..50 {
            let status = controller.play_episode().unwrap();
            assert!(status.is_game_over());
            assert!(controller.move_count() >= 5);
            controller.reset();
        }
    }

    #[test]
    fn learning_agent_is_scored_once_per_move() {
        let agents: Vec<AgentWrapper> = vec![
            MonteCarloAgent::new("mc", 1, 3).into(),
            RandomAgent::new("r", -1, 4).into(),
        ];
        let mut controller = GameController::new(game(), agents).unwrap();
        controller.play_episode().unwrap();
        let moves_by_mc = controller
            .move_history()
            .iter()
            .filter(|e| e.player == 1)
            .count();
        match &controller.agents()[0] {
            AgentWrapper::MonteCarlo(agent) => {
                assert_eq!(agent.games_played(), 1);
                assert_eq!(agent.experiences().num_values(), moves_by_mc);
            }
            _ => unreachable!(),
        }
    }
}
