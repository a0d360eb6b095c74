//! Tengen: a Go engine speaking GTP.
//!
//! ## Usage
//!
//! - `tengen gtp` - Start the GTP loop for controller/GUI integration
//! - `tengen demo` - Run a short search demo
//!
//! The binary wires the uniform oracle; a trained move-probability oracle
//! is an external collaborator plugged in through [`tengen::oracle::Oracle`].

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use tengen::config::EngineConfig;
use tengen::gtp::GtpEngine;
use tengen::mcts::{TreeNode, dump_root_stats, tree_search};
use tengen::oracle::UniformOracle;
use tengen::position::{Position, format_vertex};
use tengen::strategy::{Player, StrategyKind};

/// Tengen: a Go MCTS engine
#[derive(Parser)]
#[command(name = "tengen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) loop on stdin/stdout
    Gtp {
        /// Move generator: random, greedy, sampled, or mcts
        #[arg(long, default_value = "mcts")]
        strategy: StrategyKind,
        /// Board side length
        #[arg(long, default_value_t = 9)]
        size: usize,
        #[arg(long, default_value_t = 7.5)]
        komi: f32,
        /// Search iterations per generated move
        #[arg(long, default_value_t = 1000)]
        playouts: usize,
        /// Optional wall-clock budget per generated move, in milliseconds
        #[arg(long)]
        time_ms: Option<u64>,
        /// PUCT exploration constant
        #[arg(long, default_value_t = 1.4)]
        cpuct: f64,
        /// Seed for rollout randomness
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Run a short demo of the search
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Gtp {
            strategy,
            size,
            komi,
            playouts,
            time_ms,
            cpuct,
            seed,
        }) => {
            let config = EngineConfig {
                board_size: size,
                komi,
                playouts,
                time_budget: time_ms.map(Duration::from_millis),
                c_puct: cpuct,
                seed,
            };
            config.validate().context("invalid engine configuration")?;
            let player = Player::new(strategy, Box::new(UniformOracle), config.clone());
            GtpEngine::new(player, &config).run()
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_demo() -> anyhow::Result<()> {
    let config = EngineConfig {
        playouts: 400,
        ..EngineConfig::default()
    };
    let pos = Position::new(config.board_size, config.komi);

    println!("Running {} search iterations on an empty 9x9 board...", config.playouts);
    let mut root = TreeNode::new(pos, 1.0);
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let best = tree_search(&mut root, &UniformOracle, &config, &mut rng);
    dump_root_stats(&root);
    println!("Best move: {}", format_vertex(best, config.board_size));

    let next = root.position.play(best)?;
    println!("{next}");
    Ok(())
}
