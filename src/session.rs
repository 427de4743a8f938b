//! # Game Session - Background Game Loop
//!
//! Runs a [`GameController`] on a worker thread so an interactive front end
//! stays responsive while agents think or wait for input.
//!
//! The front end never touches the controller. It reads a [`BoardSnapshot`]
//! that the worker republishes under an `RwLock` after every move, and drains
//! [`SessionEvent`]s from a channel. Readers may see a slightly old snapshot
//! but never a half-applied move.

use crate::agents::Agent;
use crate::error::Error;
use crate::game::{Game, Mark};
use crate::game_controller::{GameController, GameStatus, MoveResult, MoveValidationError};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

/// Poll interval while the agent to move has nothing ready.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// What the renderer needs to draw one frame.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub game: Game,
    pub status: GameStatus,
    pub move_count: usize,
    pub last_move: Option<usize>,
    /// Mark of the player to move
    pub to_move: Mark,
}

impl BoardSnapshot {
    fn of<A: Agent>(controller: &GameController<A>) -> Self {
        let game = controller.game().clone();
        Self {
            to_move: game.current_player().winning_reward(),
            game,
            status: controller.status(),
            move_count: controller.move_count(),
            last_move: controller.last_move().map(|entry| entry.position),
        }
    }
}

/// Messages from the worker thread
#[derive(Debug)]
pub enum SessionEvent {
    MoveMade {
        position: usize,
        player: Mark,
        move_number: usize,
    },
    MoveRejected {
        position: usize,
        player: Mark,
        reason: MoveValidationError,
    },
    GameOver(GameStatus),
    /// The loop stopped on an unrecoverable error
    Failed(Error),
}

/// A game loop running on its own thread.
///
/// Dropping the session stops the loop and joins the thread.
pub struct GameSession<A: Agent + Send + 'static> {
    handle: Option<JoinHandle<GameController<A>>>,
    snapshot: Arc<RwLock<BoardSnapshot>>,
    rx_events: Receiver<SessionEvent>,
    stop_flag: Arc<AtomicBool>,
}

impl<A: Agent + Send + 'static> GameSession<A> {
    /// Starts playing `controller` in the background.
    ///
    /// # Arguments
    /// * `controller` - Game and agents to run
    /// * `pacing` - Pause after every applied move so a viewer can follow
    pub fn spawn(controller: GameController<A>, pacing: Duration) -> Self {
        let snapshot = Arc::new(RwLock::new(BoardSnapshot::of(&controller)));
        let (tx_events, rx_events) = mpsc::channel();
        let stop_flag = Arc::new(AtomicBool::new(false));

        let worker_snapshot = Arc::clone(&snapshot);
        let worker_stop = Arc::clone(&stop_flag);
        let handle = thread::spawn(move || {
            run_loop(controller, pacing, &worker_snapshot, &tx_events, &worker_stop)
        });

        Self {
            handle: Some(handle),
            snapshot,
            rx_events,
            stop_flag,
        }
    }

    /// Copy of the latest published board.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.snapshot.read().clone()
    }

    pub fn try_recv(&self) -> Option<SessionEvent> {
        self.rx_events.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SessionEvent> {
        match self.rx_events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Asks the loop to stop before its next step.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Waits for the loop to end and hands the controller back.
    ///
    /// Returns `None` if the worker panicked.
    pub fn join(mut self) -> Option<GameController<A>> {
        self.handle.take().and_then(|handle| handle.join().ok())
    }
}

impl<A: Agent + Send + 'static> Drop for GameSession<A> {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop<A: Agent>(
    mut controller: GameController<A>,
    pacing: Duration,
    snapshot: &RwLock<BoardSnapshot>,
    tx_events: &Sender<SessionEvent>,
    stop_flag: &AtomicBool,
) -> GameController<A> {
    while !stop_flag.load(Ordering::Relaxed) {
        match controller.step() {
            Ok(MoveResult::Success {
                position,
                player,
                game_over,
                ..
            }) => {
                *snapshot.write() = BoardSnapshot::of(&controller);
                tx_events
                    .send(SessionEvent::MoveMade {
                        position,
                        player,
                        move_number: controller.move_count(),
                    })
                    .ok();
                if game_over {
                    tx_events.send(SessionEvent::GameOver(controller.status())).ok();
                    break;
                }
                if !pacing.is_zero() {
                    thread::sleep(pacing);
                }
            }
            Ok(MoveResult::Invalid {
                position,
                player,
                reason,
            }) => {
                tx_events
                    .send(SessionEvent::MoveRejected {
                        position,
                        player,
                        reason,
                    })
                    .ok();
            }
            Ok(MoveResult::Waiting { .. }) => thread::sleep(IDLE_POLL),
            Ok(MoveResult::GameOver) => {
                tx_events.send(SessionEvent::GameOver(controller.status())).ok();
                break;
            }
            Err(e) => {
                error!(error = %e, "game loop stopped");
                tx_events.send(SessionEvent::Failed(e)).ok();
                break;
            }
        }
    }
    debug!(moves = controller.move_count(), "game loop finished");
    controller
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_wrapper::AgentWrapper;
    use crate::agents::{HumanAgent, HumanInput, RandomAgent};
    use crate::game::{BoardConfig, Player};

    fn game() -> Game {
        Game::new(
            BoardConfig::tic_tac_toe(),
            vec![Player::new("X", 1), Player::new("O", -1)],
        )
        .unwrap()
    }

    #[test]
    fn plays_to_the_end_in_the_background() {
        let agents: Vec<AgentWrapper> = vec![
            RandomAgent::new("a", 1, 5).into(),
            RandomAgent::new("b", -1, 6).into(),
        ];
        let controller = GameController::new(game(), agents).unwrap();
        let session = GameSession::spawn(controller, Duration::ZERO);

        let mut moves = 0;
        let status = loop {
            match session.recv_timeout(Duration::from_secs(5)) {
                Some(SessionEvent::MoveMade { move_number, .. }) => {
                    moves += 1;
                    assert_eq!(move_number, moves);
                }
                Some(SessionEvent::GameOver(status)) => break status,
                other => panic!("unexpected event {:?}", other),
            }
        };
        assert!(status.is_game_over());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, status);
        assert_eq!(snapshot.move_count, moves);

        let controller = session.join().unwrap();
        assert_eq!(controller.move_count(), moves);
    }

    #[test]
    fn human_moves_flow_through_the_session() {
        let x = HumanInput::new();
        let agents: Vec<AgentWrapper> = vec![
            HumanAgent::new("me", 1, x.clone()).into(),
            RandomAgent::new("bot", -1, 1).into(),
        ];
        let controller = GameController::new(game(), agents).unwrap();
        let session = GameSession::spawn(controller, Duration::ZERO);

        x.submit(4);
        match session.recv_timeout(Duration::from_secs(5)) {
            Some(SessionEvent::MoveMade {
                position, player, ..
            }) => {
                assert_eq!(position, 4);
                assert_eq!(player, 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            session.recv_timeout(Duration::from_secs(5)),
            Some(SessionEvent::MoveMade { player: -1, .. })
        ));

        // Occupied cell is rejected and X is asked again.
        x.submit(4);
        assert!(matches!(
            session.recv_timeout(Duration::from_secs(5)),
            Some(SessionEvent::MoveRejected {
                position: 4,
                reason: MoveValidationError::Occupied,
                ..
            })
        ));
        assert_eq!(session.snapshot().to_move, 1);

        session.stop();
        let controller = session.join().unwrap();
        assert_eq!(controller.move_count(), 2);
    }
}
