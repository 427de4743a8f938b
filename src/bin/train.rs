//! Trains a Monte Carlo or TD agent and measures it against exact search.

use clap::{Parser, ValueEnum};
use colored::Colorize;
use connectn::agents::{MinimaxAgent, MonteCarloAgent, RandomAgent, TemporalDifferenceAgent};
use connectn::logging::init_tracing;
use connectn::training::{evaluate, run_episodes, self_play, SelfPlayPlan};
use connectn::{
    Agent, AgentWrapper, BoardConfig, Error, Game, GameController, LearningParams, Mark, Mode,
    Player, PolicyCache, Result,
};
use std::time::Instant;
use tracing::info;

const FIXED_OPPONENT_EPISODES: usize = 10_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Learner {
    MonteCarlo,
    Td,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Opponent {
    /// The exact-search agent
    Minimax,
    /// A second learner of the same kind
    SelfPlay,
    /// Uniform random moves
    Random,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EvalMode {
    /// Always the best known move
    Adaptive,
    /// Best known move, trying unvisited moves when it looks worse than a draw
    Play,
}

impl From<EvalMode> for Mode {
    fn from(mode: EvalMode) -> Self {
        match mode {
            EvalMode::Adaptive => Mode::Adaptive,
            EvalMode::Play => Mode::Play,
        }
    }
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

    /// Which learning agent to train
    #[arg(long, value_enum, default_value_t = Learner::MonteCarlo)]
    agent: Learner,

    /// Who the learner trains against
    #[arg(long, value_enum, default_value_t = Opponent::Minimax)]
    opponent: Opponent,

    /// Training games; in self-play, the games where both sides explore
    /// (default: 10000 against fixed opponents, 50000 in self-play)
    #[arg(long)]
    episodes: Option<usize>,

    /// Self-play games where the learner follows its best line against an exploring partner
    #[arg(long, default_value_t = 25_000)]
    refine_episodes: usize,

    /// Evaluation games against the exact-search agent
    #[arg(long, default_value_t = 100)]
    eval_games: usize,

    #[arg(long, value_enum, default_value_t = EvalMode::Adaptive)]
    eval_mode: EvalMode,

    /// Let the learner move second
    #[arg(long, action = clap::ArgAction::SetTrue)]
    learner_second: bool,

    /// Override the discount factor
    #[arg(long)]
    discount: Option<f64>,

    /// Override the TD learning rate
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Override the probability of taking the best known move while learning
    #[arg(long)]
    greedy_probability: Option<f64>,

    /// Log training progress every N games (0 = never)
    #[arg(long, default_value_t = 1000)]
    log_every: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn plan(&self) -> SelfPlayPlan {
        let defaults = SelfPlayPlan::default();
        SelfPlayPlan {
            exploring_episodes: self.episodes.unwrap_or(defaults.exploring_episodes),
            refining_episodes: self.refine_episodes,
            greedy_probability: self.greedy_probability.unwrap_or(defaults.greedy_probability),
        }
    }

    fn params(&self) -> LearningParams {
        let mut params = match self.agent {
            Learner::MonteCarlo => LearningParams::monte_carlo(),
            Learner::Td => LearningParams::temporal_difference(),
        };
        if self.opponent == Opponent::SelfPlay {
            params = self.plan().learning_params(params);
        }
        if let Some(discount) = self.discount {
            params.discount = discount;
        }
        if let Some(learning_rate) = self.learning_rate {
            params.learning_rate = learning_rate;
        }
        if let Some(greedy_probability) = self.greedy_probability {
            params.greedy_probability = greedy_probability;
        }
        params
    }

    fn learner(&self, name: &str, mark: Mark, seed: u64) -> Result<AgentWrapper> {
        Ok(match self.agent {
            Learner::MonteCarlo => MonteCarloAgent::new(name, mark, seed)
                .with_params(self.params())?
                .into(),
            Learner::Td => TemporalDifferenceAgent::new(name, mark, seed)
                .with_params(self.params())?
                .into(),
        })
    }
}

fn players() -> Vec<Player> {
    vec![Player::new("X", 1), Player::new("O", -1)]
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let connect = args.connect.unwrap_or(args.rows.min(args.cols));
    let config = BoardConfig::new(args.rows, args.cols, connect)?;
    let (learner_mark, opponent_mark) = if args.learner_second { (-1, 1) } else { (1, -1) };

    println!("Connect-N Arena - Training");
    println!("==========================");
    println!("Board: {}", config);
    println!("Learner: {:?} (mark {})", args.agent, learner_mark);
    println!("Opponent: {:?}", args.opponent);
    let plan = args.plan();
    if args.opponent == Opponent::SelfPlay {
        println!(
            "Episodes: {} exploring + {} refining",
            plan.exploring_episodes, plan.refining_episodes
        );
    } else {
        println!("Episodes: {}", args.episodes.unwrap_or(FIXED_OPPONENT_EPISODES));
    }
    println!("--------------------------");

    let start = Instant::now();
    let policies = PolicyCache::new();
    let table = policies.get_or_build(config, &players())?;
    info!(states = table.len(), elapsed_ms = start.elapsed().as_millis() as u64, "policy table ready");

    let learner = args.learner("learner", learner_mark, args.seed)?;
    let opponent: AgentWrapper = match args.opponent {
        Opponent::Minimax => MinimaxAgent::new("minimax", opponent_mark, table).into(),
        Opponent::SelfPlay => args.learner("sparring", opponent_mark, args.seed.wrapping_add(1))?,
        Opponent::Random => RandomAgent::new("random", opponent_mark, args.seed.wrapping_add(1)).into(),
    };

    let start = Instant::now();
    let mut controller = GameController::new(Game::new(config, players())?, vec![learner, opponent])?;
    let training = if args.opponent == Opponent::SelfPlay {
        self_play(&mut controller, 0, &plan, args.log_every)?
    } else {
        for agent in controller.agents_mut() {
            agent.set_mode(Mode::Learn);
        }
        run_episodes(&mut controller, args.episodes.unwrap_or(FIXED_OPPONENT_EPISODES), args.log_every)?
    };
    println!("Training: {} in {:.2}s", training, start.elapsed().as_secs_f64());

    let learner = controller
        .into_agents()
        .into_iter()
        .find(|a| a.mark() == learner_mark)
        .ok_or_else(|| Error::InvalidConfiguration {
            message: "learner left the table".to_string(),
        })?;
    let examiner: AgentWrapper =
        MinimaxAgent::new("minimax", opponent_mark, policies.get_or_build(config, &players())?).into();
    let mut controller = GameController::new(Game::new(config, players())?, vec![learner, examiner])?;
    let record = evaluate(&mut controller, args.eval_games, args.eval_mode.into())?;

    let (wins, losses) = (record.wins(0), record.losses(0));
    println!("Evaluation against minimax ({:?} mode):", args.eval_mode);
    println!("  {}", format!("{} wins", wins).green());
    println!("  {}", format!("{} draws", record.draws).yellow());
    let losses_text = format!("{} losses", losses);
    if losses == 0 {
        println!("  {}", losses_text.green().bold());
    } else {
        println!("  {}", losses_text.red().bold());
    }
    if let AgentWrapper::MonteCarlo(agent) = &controller.agents()[0] {
        println!("  Learned values: {}", agent.experiences().num_values());
    } else if let AgentWrapper::TemporalDifference(agent) = &controller.agents()[0] {
        println!("  Learned values: {}", agent.experiences().num_values());
    }
    Ok(())
}
