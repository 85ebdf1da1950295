use std::path::PathBuf;

use clap::Parser;

use clue_bench::config::{BenchmarkConfig, ResolvedOutputs};
use clue_bench::logging::init_logging;
use clue_bench::tournament::TournamentRunner;

/// Headless simulation harness for automated deduction players.
#[derive(Debug, Parser)]
#[command(
    name = "clue-bench",
    author,
    version,
    about = "Deterministic all-automated game simulations"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let players = config.players.automated;
    let games = config.games.count;

    println!(
        "Loaded configuration '{run_id}' with {players} automated players ({games} game{})",
        if games == 1 { "" } else { "s" }
    );

    let runner = TournamentRunner::new(config.clone(), outputs.clone())?;

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let summary = runner.run()?;
    println!(
        "Simulation complete for '{run_id}': {} games ({} solved, {} stalled) -> {} rows at {}",
        summary.games_played,
        summary.solved,
        summary.stalled,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
