//! # Connect-N Policy Arena
//!
//! Exact and learned policies for connect-N games: two players alternately
//! mark cells of an R x C grid and the first to connect N in a row, column or
//! diagonal wins.
//!
//! ## Components
//! - [`game`]: board, players, move/unmove and win detection
//! - [`search`]: exhaustive memoized minimax producing a full policy table
//! - [`agents`]: the [`Agent`] contract and its minimax, Monte Carlo, TD,
//!   random and human implementations
//! - [`game_controller`]: the game loop seating one agent per player
//! - [`training`]: batches of games for learning and evaluation
//! - [`session`]: the game loop on a worker thread for interactive front ends
//! - [`transcript`]: plain-text game transcripts
//!
//! ## Example
//! ```rust,no_run
//! use connectn::{BoardConfig, Game, Minimax, Player};
//!
//! let players = vec![Player::new("X", 1), Player::new("O", -1)];
//! let mut game = Game::new(BoardConfig::tic_tac_toe(), players)?;
//! let table = Minimax::solve(&mut game)?;
//! let root = table.get(&game.state_key()).expect("root is solved");
//! assert_eq!(root.value, 0);
//! # Ok::<(), connectn::Error>(())
//! ```

pub mod agent_wrapper;
pub mod agents;
pub mod error;
pub mod game;
pub mod game_controller;
pub mod logging;
pub mod search;
pub mod session;
pub mod training;
pub mod transcript;

pub use agent_wrapper::AgentWrapper;
pub use agents::{Agent, LearningParams, Mode, RewardScheme};
pub use error::{Error, Result};
pub use game::{BoardConfig, CellInput, Game, Mark, Player, StateKey, DRAW_VALUE, NEUTRAL};
pub use game_controller::{GameController, GameStatus, MoveResult};
pub use search::{Minimax, PolicyCache, PolicyEntry, PolicyTable};
