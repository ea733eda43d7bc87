mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::CliConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ghost")]
#[command(about = "Ghost - a social-deduction word game for the terminal")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many of each role a game gets
    Roles,
    /// Play a hot-seat game on this terminal
    Play {
        /// Close registration once this many players have joined
        #[arg(short, long)]
        players: Option<usize>,
        /// Seed for role allocation
        #[arg(short, long)]
        seed: Option<u64>,
        /// Only accept words from this file (one per line)
        #[arg(short, long)]
        word_list: Option<PathBuf>,
    },
    /// Play a game with scripted players
    Simulate {
        /// Number of players (3-10)
        #[arg(short, long, default_value_t = 5)]
        players: usize,
        /// Seed for roles and every scripted decision
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the final game state as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).await?;

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "ghost={},ghost_engine={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match cli.command {
        Commands::Roles => {
            commands::show_roles();
            Ok(())
        }
        Commands::Play {
            players,
            seed,
            word_list,
        } => commands::play_game(&config, players, seed, word_list).await,
        Commands::Simulate {
            players,
            seed,
            json,
        } => commands::simulate_game(players, seed, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
