use std::io;
use std::time::Duration;

use clap::Parser;
use rush::evaluation::EvalConfig;
use rush::search::{Depth, Limits, DEFAULT_DEPTH};
use tracing_subscriber::EnvFilter;

/// Chess engine that speaks a subset of the Universal Chess Interface on
/// stdin/stdout. Logs go to stderr and are configured through `RUSH_LOG` (or
/// `RUST_LOG`).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// Search depth in plies.
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: Depth,
    /// Seed for picking among equally good moves. Random if not set.
    #[arg(long)]
    seed: Option<u64>,
    /// Add the mobility term to the evaluation.
    #[arg(long)]
    mobility: bool,
    /// Stop searching after visiting this many positions.
    #[arg(long)]
    nodes: Option<u64>,
    /// Stop searching after this many milliseconds.
    #[arg(long)]
    movetime: Option<u64>,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_env("RUSH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    setup_logging();
    tracing::debug!("{config:?}");
    rush::print_engine_info();

    let limits = Limits {
        depth: config.depth,
        nodes: config.nodes,
        movetime: config.movetime.map(Duration::from_millis),
    };
    let eval = EvalConfig {
        mobility: config.mobility,
        ..EvalConfig::default()
    };

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut engine = rush::Engine::new(&mut input, &mut output, limits, eval, config.seed);
    engine.uci_loop()
}
