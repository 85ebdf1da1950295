use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::tournament::{GameOutcome, GameResult};

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build normal distribution: {0}")]
    Distribution(String),
}

/// Accumulates per-seat results across a run.
pub struct AnalyticsCollector {
    run_id: String,
    players: usize,
    seats: Vec<SeatAccumulator>,
    turns: Vec<f64>,
    solved: usize,
    last_standing: usize,
    stalled: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let players = config.players.automated;
        Self {
            run_id: config.run_id.clone(),
            players,
            seats: (0..players).map(|_| SeatAccumulator::default()).collect(),
            turns: Vec::with_capacity(config.games.count),
            solved: 0,
            last_standing: 0,
            stalled: 0,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) {
        self.turns.push(f64::from(outcome.turns));
        match outcome.result {
            GameResult::Solved => self.solved += 1,
            GameResult::LastStanding => self.last_standing += 1,
            GameResult::Stalled => self.stalled += 1,
        }

        for seat in &outcome.seat_results {
            let Some(acc) = self.seats.get_mut(seat.seat.index()) else {
                continue;
            };
            acc.games += 1;
            acc.suggestions += u64::from(seat.suggestions);
            if seat.won {
                acc.wins += 1;
            }
            if seat.correct_accusation {
                acc.correct_accusations += 1;
            }
            if seat.eliminated {
                acc.wrong_accusations += 1;
            }
        }
    }

    pub fn finalize(self) -> Result<AnalyticsSummary, AnalyticsError> {
        let z = z_score(CONFIDENCE_LEVEL)?;
        let games = self.turns.len();
        let seats = self
            .seats
            .iter()
            .enumerate()
            .map(|(index, acc)| {
                let win_rate = ratio(acc.wins, acc.games);
                SeatReport {
                    seat: format!("P{index}"),
                    games: acc.games,
                    wins: acc.wins,
                    win_rate,
                    ci95: proportion_interval(win_rate, acc.games, z),
                    correct_accusations: acc.correct_accusations,
                    wrong_accusations: acc.wrong_accusations,
                    avg_suggestions: if acc.games == 0 {
                        0.0
                    } else {
                        acc.suggestions as f64 / acc.games as f64
                    },
                }
            })
            .collect();

        Ok(AnalyticsSummary {
            run_id: self.run_id,
            players: self.players,
            games,
            solved: self.solved,
            last_standing: self.last_standing,
            stalled: self.stalled,
            avg_turns: mean(&self.turns),
            turns_ci95: mean_interval(&self.turns, z),
            seats,
        })
    }
}

#[derive(Debug, Default)]
struct SeatAccumulator {
    games: usize,
    wins: usize,
    correct_accusations: usize,
    wrong_accusations: usize,
    suggestions: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub players: usize,
    pub games: usize,
    pub solved: usize,
    pub last_standing: usize,
    pub stalled: usize,
    pub avg_turns: f64,
    pub turns_ci95: (f64, f64),
    pub seats: Vec<SeatReport>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Simulation Summary\n\n");
        rows.push_str(&format!(
            "Run `{}`: {} games, {} automated players\n\n",
            self.run_id, self.games, self.players
        ));
        rows.push_str(&format!(
            "- Solved by correct accusation: {} ({:.1}%)\n",
            self.solved,
            ratio(self.solved, self.games) * 100.0
        ));
        rows.push_str(&format!(
            "- Won as last player standing: {} ({:.1}%)\n",
            self.last_standing,
            ratio(self.last_standing, self.games) * 100.0
        ));
        rows.push_str(&format!("- Stalled at round limit: {}\n", self.stalled));
        rows.push_str(&format!(
            "- Average turns: {:.2} (95% CI [{:.2}, {:.2}])\n\n",
            self.avg_turns, self.turns_ci95.0, self.turns_ci95.1
        ));
        rows.push_str("| Seat | Games | Wins | Win % | 95% CI | Correct accusations | Wrong accusations | Avg suggestions |\n");
        rows.push_str("|------|-------|------|-------|--------|---------------------|-------------------|-----------------|\n");

        for seat in &self.seats {
            rows.push_str(&format!(
                "| {seat} | {games} | {wins} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {correct} | {wrong} | {suggestions:.2} |\n",
                seat = seat.seat,
                games = seat.games,
                wins = seat.wins,
                win = seat.win_rate * 100.0,
                ci_low = seat.ci95.0 * 100.0,
                ci_high = seat.ci95.1 * 100.0,
                correct = seat.correct_accusations,
                wrong = seat.wrong_accusations,
                suggestions = seat.avg_suggestions,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatReport {
    pub seat: String,
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub correct_accusations: usize,
    pub wrong_accusations: usize,
    pub avg_suggestions: f64,
}

fn z_score(level: f64) -> Result<f64, AnalyticsError> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|err| AnalyticsError::Distribution(err.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Normal-approximation interval for a proportion, clamped to `[0, 1]`.
fn proportion_interval(rate: f64, samples: usize, z: f64) -> (f64, f64) {
    if samples == 0 {
        return (0.0, 0.0);
    }
    let margin = z * (rate * (1.0 - rate) / samples as f64).sqrt();
    ((rate - margin).max(0.0), (rate + margin).min(1.0))
}

fn mean_interval(values: &[f64], z: f64) -> (f64, f64) {
    let mean = mean(values);
    if values.len() < 2 {
        return (mean, mean);
    }
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    let margin = z * (variance / values.len() as f64).sqrt();
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_score_matches_two_sided_95() {
        let z = z_score(0.95).expect("z");
        assert!((z - 1.959964).abs() < 1e-5);
    }

    #[test]
    fn proportion_interval_is_clamped() {
        let (low, high) = proportion_interval(1.0, 10, 1.96);
        assert_eq!((low, high), (1.0, 1.0));
        let (low, high) = proportion_interval(0.5, 100, 1.96);
        assert!((low - 0.402).abs() < 1e-9);
        assert!((high - 0.598).abs() < 1e-9);
        assert_eq!(proportion_interval(0.3, 0, 1.96), (0.0, 0.0));
    }

    #[test]
    fn mean_interval_handles_small_samples() {
        assert_eq!(mean_interval(&[], 1.96), (0.0, 0.0));
        assert_eq!(mean_interval(&[4.0], 1.96), (4.0, 4.0));
        let (low, high) = mean_interval(&[2.0, 4.0], 1.96);
        assert!((low - 1.04).abs() < 1e-9);
        assert!((high - 4.96).abs() < 1e-9);
    }
}
