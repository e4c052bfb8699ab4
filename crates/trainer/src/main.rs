//! qchess CLI
//!
//! Train the Q-learning engine by self-play and query it.
//!
//! Usage:
//!   qchess self-play --games 20
//!   qchess best-move "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
//!   qchess evaluate "<fen>"
//!   qchess check-history --recent
//!   qchess stats
//!   qchess init-config --output qchess.toml
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_core::Position;
use qlearning_engine::{
    AppConfig, GameStore, HistoryMode, HyperparameterUpdate, JsonFileStore, SelfPlayTrainer,
};

#[derive(Parser)]
#[command(name = "qchess", about = "Tabular Q-learning chess engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to TOML configuration file
    #[arg(long, global = true, default_value = "qchess.toml")]
    config: PathBuf,

    /// Override the game store path
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Override the exploration rate
    #[arg(long, global = true)]
    epsilon: Option<f64>,

    /// Override the learning rate
    #[arg(long, global = true)]
    alpha: Option<f64>,

    /// Override the discount factor
    #[arg(long, global = true)]
    gamma: Option<f64>,

    /// Seed for exploration, evaluation jitter and replay sampling
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn from stored games, play new games and save them
    SelfPlay {
        #[arg(long, default_value_t = 10)]
        games: usize,
    },
    /// Pick a move for a position
    BestMove { fen: String },
    /// Value of a position from White's side
    Evaluate { fen: String },
    /// Dry run: replay stored games into a throwaway engine and report
    /// how many are usable. Nothing learned is kept.
    CheckHistory {
        /// Only the most recent games (see `self_play.recent_games`).
        /// Defaults to `self_play.history_mode`.
        #[arg(long)]
        recent: bool,
    },
    /// Aggregate counts over the game store
    Stats,
    /// Print or write a config file with every default value
    InitConfig {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::InitConfig { output } = &cli.command {
        return init_config(output.as_ref());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(path) = &cli.store {
        config.storage.path = path.clone();
    }
    if cli.seed.is_some() {
        config.self_play.seed = cli.seed;
    }

    let store = JsonFileStore::new(&config.storage.path);
    let mut trainer =
        SelfPlayTrainer::from_config(&config, store).context("invalid configuration")?;

    let update = HyperparameterUpdate {
        epsilon: cli.epsilon,
        alpha: cli.alpha,
        gamma: cli.gamma,
    };
    if !update.is_empty() {
        trainer
            .set_hyperparameters(update)
            .context("invalid hyperparameter override")?;
    }

    match cli.command {
        Commands::SelfPlay { games } => {
            let report = trainer
                .run_self_play(games)
                .with_context(|| format!("self-play run of {games} games"))?;
            if report.cancelled {
                info!(completed = report.games.len(), "self-play stopped early");
            }
            println!("{}", serde_json::to_string_pretty(&report.summary)?);
            println!("{}", serde_json::to_string_pretty(&trainer.training_stats())?);
        }
        Commands::BestMove { fen } => {
            check_fen(&fen)?;
            let choice = trainer.get_move(&fen);
            match choice.best_move {
                Some(mv) => println!("{mv} (confidence {:.3})", choice.confidence),
                None => println!("no legal moves"),
            }
        }
        Commands::Evaluate { fen } => {
            check_fen(&fen)?;
            println!("{:.2}", trainer.evaluate(&fen));
        }
        Commands::CheckHistory { recent } => {
            let mode = if recent {
                HistoryMode::Recent
            } else {
                config.self_play.history_mode
            };
            let report = trainer
                .ingest_history(mode)
                .with_context(|| format!("reading {}", config.storage.path.display()))?;
            if report.processed == 0 {
                println!("no usable game history");
            } else {
                println!(
                    "processed {} games ({} skipped), {} transitions, {} batch updates",
                    report.processed, report.skipped, report.transitions, report.batch_updates
                );
            }
        }
        Commands::Stats => {
            let aggregate = trainer
                .store()
                .aggregate()
                .with_context(|| format!("reading {}", config.storage.path.display()))?;
            println!("{}", serde_json::to_string_pretty(&aggregate)?);
        }
        Commands::InitConfig { output } => init_config(output.as_ref())?,
    }

    Ok(())
}

fn init_config(output: Option<&PathBuf>) -> Result<()> {
    let text = AppConfig::default_toml();
    match output {
        Some(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            std::fs::write(path, text)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote default config");
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// The engine treats a malformed FEN as neutral; on the command line it is
/// a usage error.
fn check_fen(fen: &str) -> Result<()> {
    Position::from_fen(fen)
        .map(|_| ())
        .with_context(|| format!("invalid FEN '{fen}'"))
}
