use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clue_bot::{BotParams, heuristic_factory};
use clue_core::game::engine::{GameEngine, TurnAction};
use clue_core::game::error::SetupError;
use clue_core::game::setup::GameSetup;
use clue_core::model::catalog::Catalog;
use clue_core::model::seat::Seat;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;

/// Primary entry point for batches of all-automated games.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    catalog: Catalog,
    bot_params: BotParams,
    logging_enabled: bool,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub solved: usize,
    pub stalled: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration. `CLUE_BOT_*` variables
    /// override the configured bot parameters.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let catalog = config.catalog();
        GameSetup::all_automated(config.players.automated)
            .with_catalog(catalog.clone())
            .validate()?;

        Ok(Self {
            bot_params: config
                .bot
                .with_overrides(|key| std::env::var(key).ok()),
            logging_enabled: config.logging.enable_structured,
            catalog,
            config,
            outputs,
        })
    }

    pub fn bot_params(&self) -> &BotParams {
        &self.bot_params
    }

    /// Play every game, streaming one JSONL row per game to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut rows_written = 0usize;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let outcome = self.play_game(game_index, game_seed)?;
            analytics.record_game(&outcome);
            write_game_row(&mut writer, &self.config, &outcome)?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.report_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            games_played: self.config.games.count,
            rows_written,
            solved: summary.solved,
            stalled: summary.stalled,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(&self, game_index: usize, game_seed: u64) -> Result<GameOutcome, RunnerError> {
        let players = self.config.players.automated;
        let setup = GameSetup::all_automated(players)
            .with_seed(game_seed)
            .with_catalog(self.catalog.clone());
        let mut engine = GameEngine::new(setup, heuristic_factory(self.bot_params))?;
        let turn_limit = self.config.games.max_rounds.saturating_mul(players as u32);
        let mut seats: Vec<SeatResult> = engine
            .player_names()
            .into_iter()
            .enumerate()
            .map(|(index, name)| SeatResult::new(Seat(index), name))
            .collect();

        let start = Instant::now();
        while !engine.is_over() && engine.turn_state().turns_taken < turn_limit {
            let seat = engine.current_player();
            let action = engine.take_automated_turn();
            let stats = &mut seats[seat.index()];
            match &action {
                TurnAction::Accused { correct, .. } => {
                    stats.accusations += 1;
                    stats.correct_accusation |= *correct;
                    stats.eliminated |= !*correct;
                }
                TurnAction::Suggested { outcome, .. } => {
                    stats.suggestions += 1;
                    if !outcome.was_refuted() {
                        stats.unrefuted += 1;
                    }
                }
                TurnAction::Idle => {
                    return Err(RunnerError::game(format!(
                        "seat {seat} had no automated action in game {game_index}"
                    )));
                }
            }

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                log_turn(&self.config.run_id, game_index, seat, &action);
            }
            engine.next_turn();
        }
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let winner = engine.winner();
        if let Some(seat) = winner {
            seats[seat.index()].won = true;
        }
        let result = match (winner, engine.revealed_solution()) {
            (Some(_), Some(_)) => GameResult::Solved,
            (Some(_), None) => GameResult::LastStanding,
            (None, _) => GameResult::Stalled,
        };

        let turns = engine.turn_state().turns_taken;
        Ok(GameOutcome {
            game_index,
            game_seed,
            result,
            winner,
            winner_name: winner.map(|seat| seats[seat.index()].name.clone()),
            turns,
            rounds: turns.div_ceil(players as u32),
            solution: engine.revealed_solution().map(ToString::to_string),
            seat_results: seats,
            elapsed_ms,
        })
    }
}

fn log_turn(run_id: &str, game_index: usize, seat: Seat, action: &TurnAction) {
    let (kind, detail) = match action {
        TurnAction::Accused {
            accusation,
            correct,
        } => (
            if *correct { "accuse_correct" } else { "accuse_wrong" },
            accusation.to_string(),
        ),
        TurnAction::Suggested {
            suggestion,
            outcome,
        } => (
            if outcome.was_refuted() { "suggest_refuted" } else { "suggest_unrefuted" },
            suggestion.to_string(),
        ),
        TurnAction::Idle => ("idle", String::new()),
    };
    event!(
        target: "clue_bench::turn",
        Level::INFO,
        run_id = %run_id,
        game_index = game_index as u32,
        seat = %seat,
        action = kind,
        detail = %detail
    );
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id: config.run_id.clone(),
        game_id: format!("G{:05}", outcome.game_index),
        game_index: outcome.game_index,
        game_seed: outcome.game_seed,
        players: outcome.seat_results.len(),
        result: outcome.result,
        winner: outcome.winner_name.clone(),
        winner_seat: outcome.winner.map(Seat::index),
        turns: outcome.turns,
        rounds: outcome.rounds,
        solution: outcome.solution.clone(),
        seats: outcome
            .seat_results
            .iter()
            .map(|seat| SeatRow {
                seat: seat.seat.to_string(),
                bot: seat.name.clone(),
                suggestions: seat.suggestions,
                unrefuted: seat.unrefuted,
                accusations: seat.accusations,
                eliminated: seat.eliminated,
                won: seat.won,
            })
            .collect(),
        elapsed_ms: outcome.elapsed_ms,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Solved,
    LastStanding,
    Stalled,
}

pub struct GameOutcome {
    pub game_index: usize,
    pub game_seed: u64,
    pub result: GameResult,
    pub winner: Option<Seat>,
    pub winner_name: Option<String>,
    pub turns: u32,
    pub rounds: u32,
    pub solution: Option<String>,
    pub seat_results: Vec<SeatResult>,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone)]
pub struct SeatResult {
    pub seat: Seat,
    pub name: String,
    pub suggestions: u32,
    pub unrefuted: u32,
    pub accusations: u32,
    pub correct_accusation: bool,
    pub eliminated: bool,
    pub won: bool,
}

impl SeatResult {
    fn new(seat: Seat, name: String) -> Self {
        Self {
            seat,
            name,
            suggestions: 0,
            unrefuted: 0,
            accusations: 0,
            correct_accusation: false,
            eliminated: false,
            won: false,
        }
    }
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    players: usize,
    result: GameResult,
    winner: Option<String>,
    winner_seat: Option<usize>,
    turns: u32,
    rounds: u32,
    solution: Option<String>,
    seats: Vec<SeatRow>,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct SeatRow {
    seat: String,
    bot: String,
    suggestions: u32,
    unrefuted: u32,
    accusations: u32,
    eliminated: bool,
    won: bool,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("game setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path, count: usize, players: usize) -> BenchmarkConfig {
        let yaml = format!(
            r#"
run_id: "unit"
games:
  seed: 7
  count: {count}
players:
  automated: {players}
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
"#,
            jsonl = dir.join("games.jsonl").display(),
            summary = dir.join("summary.md").display(),
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("yaml");
        cfg.validate().expect("valid");
        cfg
    }

    #[test]
    fn every_seat_acts_and_one_wins() {
        let dir = std::env::temp_dir().join("clue-bench-unit-every-seat");
        let cfg = config(&dir, 1, 3);
        let outputs = cfg.resolved_outputs();
        let runner = TournamentRunner::new(cfg, outputs).expect("runner");

        let outcome = runner.play_game(0, 99).expect("game");
        assert_eq!(outcome.seat_results.len(), 3);
        assert!(outcome.seat_results.iter().all(|seat| seat.suggestions + seat.accusations > 0));
        assert_ne!(outcome.result, GameResult::Stalled);
        assert_eq!(
            outcome.seat_results.iter().filter(|seat| seat.won).count(),
            1
        );
    }

    #[test]
    fn catalog_too_small_for_the_table_is_rejected() {
        let dir = std::env::temp_dir().join("clue-bench-unit-tiny");
        let mut cfg = config(&dir, 1, 2);
        cfg.catalog = Some(
            Catalog::new(vec!["Ann".into()], vec!["Rope".into()], vec!["Hall".into()])
                .expect("catalog"),
        );
        let outputs = cfg.resolved_outputs();
        let Err(err) = TournamentRunner::new(cfg, outputs) else {
            panic!("a 1-1-1 catalog leaves nothing to deal");
        };
        assert!(matches!(
            err,
            RunnerError::Setup(SetupError::CatalogTooSmall {
                cards: 0,
                players: 2
            })
        ));
    }

    #[test]
    fn first_player_solves_a_single_open_category() {
        let dir = std::env::temp_dir().join("clue-bench-unit-rooms");
        let mut cfg = config(&dir, 1, 2);
        cfg.catalog = Some(
            Catalog::new(
                vec!["Ann".into()],
                vec!["Rope".into()],
                vec!["Hall".into(), "Study".into(), "Kitchen".into()],
            )
            .expect("catalog"),
        );
        let outputs = cfg.resolved_outputs();
        let runner = TournamentRunner::new(cfg, outputs).expect("runner");

        let outcome = runner.play_game(0, 5).expect("game");
        assert_eq!(outcome.result, GameResult::Solved);
        assert_eq!(outcome.winner, Some(Seat(0)));
        assert!(
            outcome
                .solution
                .as_deref()
                .is_some_and(|text| text.starts_with("Ann with the Rope in the"))
        );
    }
}
