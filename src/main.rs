//! # Connect-N Arena
//!
//! Interactive play against the exact-search agent, a random agent, or a
//! Monte Carlo / TD learner trained by self-play before the game starts.
//!
//! Moves are entered as `row,col` (zero-based). Enter `q` to quit.
//!
//! ## Usage
//! Run with `cargo run --release --bin play -- --opponent td` for a trained
//! TD opponent on tic-tac-toe.

use clap::{Parser, ValueEnum};
use colored::Colorize;
use connectn::agents::{
    HumanAgent, HumanInput, MinimaxAgent, MonteCarloAgent, RandomAgent, TemporalDifferenceAgent,
};
use connectn::logging::init_tracing;
use connectn::session::{GameSession, SessionEvent};
use connectn::training::{self_play, SelfPlayPlan};
use connectn::{
    Agent, AgentWrapper, BoardConfig, CellInput, Error, Game, GameController, GameStatus,
    LearningParams, Mark, Mode, Player, PolicyCache, Result,
};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use tracing::info;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Opponent {
    /// Plays the exact minimax policy
    Minimax,
    /// Picks uniformly among free cells
    Random,
    /// Monte Carlo control agent trained by self-play
    MonteCarlo,
    /// TD control agent trained by self-play
    Td,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = 3)]
    rows: usize,

    #[arg(long, default_value_t = 3)]
    cols: usize,

    /// Run length needed to win (default: min(rows, cols))
    #[arg(long)]
    connect: Option<usize>,

    #[arg(long, value_enum, default_value_t = Opponent::Minimax)]
    opponent: Opponent,

    /// Let the computer move first
    #[arg(long, action = clap::ArgAction::SetTrue)]
    human_second: bool,

    /// Self-play games where both learners explore
    #[arg(long, default_value_t = 50_000)]
    explore_episodes: usize,

    /// Self-play games where the learner follows its best line
    #[arg(long, default_value_t = 25_000)]
    refine_episodes: usize,

    /// Pause after each move in milliseconds
    #[arg(long, default_value_t = 300)]
    pacing_ms: u64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn players() -> Vec<Player> {
    vec![Player::new("X", 1), Player::new("O", -1)]
}

fn symbol(mark: Mark) -> colored::ColoredString {
    match mark {
        1 => " X ".blue().bold(),
        -1 => " O ".red().bold(),
        _ => " . ".dimmed(),
    }
}

fn render(game: &Game, last_move: Option<usize>) {
    let config = game.config();
    print!("   ");
    for c in 0..config.num_cols() {
        print!("{:^3}", c);
    }
    println!();
    for (r, row) in game.cells().chunks(config.num_cols()).enumerate() {
        print!("{:>2} ", r);
        for (c, &mark) in row.iter().enumerate() {
            let cell = symbol(mark);
            if last_move.is_some() && config.position(r, c) == last_move {
                print!("{}", cell.underline());
            } else {
                print!("{}", cell);
            }
        }
        println!();
    }
}

/// Builds the computer player, training learners against a copy of themselves.
fn build_opponent(args: &Args, config: BoardConfig, mark: Mark) -> Result<AgentWrapper> {
    let plan = SelfPlayPlan {
        exploring_episodes: args.explore_episodes,
        refining_episodes: args.refine_episodes,
        ..SelfPlayPlan::default()
    };
    let sparring_seed = args.seed.wrapping_add(1);
    let (agent, sparring): (AgentWrapper, AgentWrapper) = match args.opponent {
        Opponent::Minimax => {
            let table = PolicyCache::new().get_or_build(config, &players())?;
            info!(states = table.len(), "policy table ready");
            return Ok(MinimaxAgent::new("Minimax", mark, table).into());
        }
        Opponent::Random => return Ok(RandomAgent::new("Random", mark, args.seed).into()),
        Opponent::MonteCarlo => {
            let params = plan.learning_params(LearningParams::monte_carlo());
            (
                MonteCarloAgent::new("Monte Carlo", mark, args.seed).with_params(params)?.into(),
                MonteCarloAgent::new("sparring", -mark, sparring_seed).with_params(params)?.into(),
            )
        }
        Opponent::Td => {
            let params = plan.learning_params(LearningParams::temporal_difference());
            (
                TemporalDifferenceAgent::new("TD", mark, args.seed).with_params(params)?.into(),
                TemporalDifferenceAgent::new("sparring", -mark, sparring_seed).with_params(params)?.into(),
            )
        }
    };

    println!("Training {} for {} games...", agent.name(), plan.total_episodes());
    let mut controller = GameController::new(Game::new(config, players())?, vec![agent, sparring])?;
    let record = self_play(&mut controller, 0, &plan, 0)?;
    println!("Self-play: {}", record);

    let mut agent = controller
        .into_agents()
        .into_iter()
        .find(|a| a.mark() == mark)
        .ok_or_else(|| Error::InvalidConfiguration {
            message: "trained agent missing".to_string(),
        })?;
    agent.set_mode(Mode::Play);
    Ok(agent)
}

/// Forwards stdin lines; the thread ends with stdin.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn prompt() {
    print!("Your move (row,col): ");
    let _ = io::stdout().flush();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let connect = args.connect.unwrap_or(args.rows.min(args.cols));
    let config = BoardConfig::new(args.rows, args.cols, connect)?;
    let (human_mark, computer_mark) = if args.human_second { (-1, 1) } else { (1, -1) };

    println!("{}", format!("Connect-N Arena: {}", config).bold());
    let computer = build_opponent(&args, config, computer_mark)?;
    println!("You are {} against {}", symbol(human_mark), computer);

    let input = HumanInput::new();
    let human: AgentWrapper = HumanAgent::new("You", human_mark, input.clone()).into();
    let controller = GameController::new(Game::new(config, players())?, vec![human, computer])?;
    let session = GameSession::spawn(controller, Duration::from_millis(args.pacing_ms));
    let lines = spawn_stdin_reader();

    let snapshot = session.snapshot();
    render(&snapshot.game, None);
    if snapshot.to_move == human_mark {
        prompt();
    }

    loop {
        while let Ok(line) = lines.try_recv() {
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                session.stop();
                println!("Bye.");
                return Ok(());
            }
            match line.parse::<CellInput>() {
                Ok(cell) => match cell.to_position(&config) {
                    Some(position) => input.submit(position),
                    None => {
                        println!("{}", format!("({}, {}) is off the board", cell.0, cell.1).red());
                        prompt();
                    }
                },
                Err(e) => {
                    println!("{}", e.to_string().red());
                    prompt();
                }
            }
        }

        let Some(event) = session.recv_timeout(Duration::from_millis(50)) else {
            if session.is_finished() {
                break;
            }
            continue;
        };
        match event {
            SessionEvent::MoveMade { .. } => {
                let snapshot = session.snapshot();
                println!();
                render(&snapshot.game, snapshot.last_move);
                if !snapshot.status.is_game_over() && snapshot.to_move == human_mark {
                    prompt();
                }
            }
            SessionEvent::MoveRejected { position, reason, .. } => {
                println!("{}", format!("Cell {} rejected: {}", position, reason).red());
                prompt();
            }
            SessionEvent::GameOver(status) => {
                match status {
                    GameStatus::Win(mark) if mark == human_mark => {
                        println!("{}", "You win!".green().bold())
                    }
                    GameStatus::Win(_) => println!("{}", "You lose.".red().bold()),
                    _ => println!("{}", "Draw.".yellow().bold()),
                }
                break;
            }
            SessionEvent::Failed(e) => return Err(e),
        }
    }

    if let Some(controller) = session.join() {
        println!("{}", controller.format_history());
    }
    Ok(())
}
