//! Builds minimax policies over a range of board sizes, times each build, and
//! records transcripts of exact-search self-play from random openings.

use clap::Parser;
use colored::Colorize;
use connectn::agents::MinimaxAgent;
use connectn::logging::init_tracing;
use connectn::transcript::TranscriptWriter;
use connectn::{
    AgentWrapper, BoardConfig, Error, Game, GameController, GameStatus, Minimax, MoveResult, Player,
    Result,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Smallest row and column count to analyze
    #[arg(long, default_value_t = 3)]
    min_size: usize,

    /// Largest row and column count to analyze (5 and up take a very long time)
    #[arg(long, default_value_t = 4)]
    max_size: usize,

    /// Games played per board size
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Directory for transcripts and policy dumps
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write every solved state to best_policies_{rows}_{cols}.txt
    #[arg(long, action = clap::ArgAction::SetTrue)]
    dump_policies: bool,

    /// Worker threads; board sizes are solved in parallel (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Seed for the random openings
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Results for one board size.
struct ConfigSummary {
    config: BoardConfig,
    states: usize,
    build_time: Duration,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
}

fn players() -> Vec<Player> {
    vec![Player::new("Reward Player", 1), Player::new("Reward Player", -1)]
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| Error::io(format!("create {}", path.display()), e))
}

fn analyze(config: BoardConfig, args: &Args) -> Result<ConfigSummary> {
    let (rows, cols) = (config.num_rows(), config.num_cols());
    info!(board = %config, "building best policies according to minimax algorithm");

    let mut game = Game::new(config, players())?;
    let start = Instant::now();
    let table = Arc::new(Minimax::solve(&mut game)?);
    let build_time = start.elapsed();

    if args.dump_policies {
        let path = args.output_dir.join(format!("best_policies_{}_{}.txt", rows, cols));
        let mut dump = create(&path)?;
        table.write_to(&mut dump)?;
        dump.flush()
            .map_err(|e| Error::io(format!("flush {}", path.display()), e))?;
    }

    let path = args.output_dir.join(format!("game_results_{}_{}.txt", rows, cols));
    let mut transcript = TranscriptWriter::new(create(&path)?);
    transcript.build_time(build_time)?;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed ^ (((rows as u64) << 32) | cols as u64));
    let mut summary = ConfigSummary {
        config,
        states: table.len(),
        build_time,
        first_wins: 0,
        second_wins: 0,
        draws: 0,
    };

    for game_idx in 0..args.games {
        let agents: Vec<AgentWrapper> = vec![
            MinimaxAgent::new("minimax", 1, Arc::clone(&table)).into(),
            MinimaxAgent::new("minimax", -1, Arc::clone(&table)).into(),
        ];
        let mut controller = GameController::new(Game::new(config, players())?, agents)?;
        transcript.begin_game(game_idx)?;

        let opening = rng.random_range(0..config.num_cells());
        controller.try_make_move(opening)?;
        transcript.board(controller.game())?;
        while !controller.is_game_over() {
            if let MoveResult::Success { .. } = controller.step()? {
                transcript.board(controller.game())?;
            }
        }

        transcript.result(controller.game().get_winner())?;
        match controller.status() {
            GameStatus::Win(1) => summary.first_wins += 1,
            GameStatus::Win(_) => summary.second_wins += 1,
            _ => summary.draws += 1,
        }
    }
    transcript.flush()?;
    info!(
        board = %config,
        states = summary.states,
        elapsed_ms = build_time.as_millis() as u64,
        "finished board size"
    );
    Ok(summary)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    if args.min_size == 0 || args.min_size > args.max_size {
        return Err(Error::InvalidConfiguration {
            message: format!(
                "size range {}..={} is empty",
                args.min_size, args.max_size
            ),
        });
    }
    let threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };

    println!("Connect-N Arena - Minimax Analysis");
    println!("==================================");
    println!("Sizes: {}..={} x {}..={}", args.min_size, args.max_size, args.min_size, args.max_size);
    println!("Games per size: {}", args.games);
    println!("Threads: {}", threads);
    println!("Output: {}", args.output_dir.display());
    println!("----------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Policy builds will be significantly slower.\nUse --release for accurate timings.\n");

    let mut configs = Vec::new();
    for rows in args.min_size..=args.max_size {
        for cols in args.min_size..=args.max_size {
            configs.push(BoardConfig::new(rows, cols, rows.min(cols))?);
        }
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::InvalidConfiguration {
            message: format!("cannot build thread pool: {}", e),
        })?;
    let summaries: Vec<Result<ConfigSummary>> =
        pool.install(|| configs.par_iter().map(|&config| analyze(config, &args)).collect());

    for summary in summaries {
        let s = summary?;
        println!("{}", format!("{}", s.config).bold());
        println!("  States: {}", s.states);
        println!("  Build time: {:.3}s", s.build_time.as_secs_f64());
        println!(
            "  Results: {} / {} / {}",
            format!("{} first-player wins", s.first_wins).green(),
            format!("{} second-player wins", s.second_wins).red(),
            format!("{} draws", s.draws).yellow()
        );
    }
    Ok(())
}
