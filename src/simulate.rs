//! Batch simulation: many independent games in parallel with aggregate stats
//!
//! Game `i` is seeded with `"{seed}-{i}"`, so a batch is reproducible from its
//! base seed regardless of how rayon schedules the games.

use crate::game::{
    run_game, EndReason, GameLogger, RunGameOptions, StateHashMode, WarRulesInput,
};
use crate::{Result, WarError};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOptions {
    pub games: usize,
    pub seed: String,
    pub player_names: Option<Vec<String>>,
    pub rules: WarRulesInput,
}

impl SimulationOptions {
    pub fn new(games: usize, seed: impl Into<String>) -> Self {
        SimulationOptions {
            games,
            seed: seed.into(),
            player_names: None,
            rules: WarRulesInput::default(),
        }
    }

    fn game_options(&self, index: usize) -> RunGameOptions {
        let options = RunGameOptions::new(format!("{}-{index}", self.seed))
            .rules(self.rules.clone())
            .state_hash_mode(StateHashMode::Off)
            .collect_events(false);
        match &self.player_names {
            Some(names) => options.player_names(names.clone()),
            None => options,
        }
    }
}

/// What one simulated game produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GameOutcome {
    winner: Option<usize>,
    end_reason: Option<EndReason>,
    rounds: u32,
    wars: u32,
}

/// Summary statistics of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    pub p50: u32,
    pub p90: u32,
    pub p99: u32,
}

impl Distribution {
    /// `None` for an empty sample; percentiles use the nearest-rank method
    pub fn from_samples(samples: &[u32]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let total: u64 = sorted.iter().map(|&v| u64::from(v)).sum();
        let nearest_rank = |p: f64| {
            let rank = (p * sorted.len() as f64 / 100.0).ceil() as usize;
            sorted[rank.clamp(1, sorted.len()) - 1]
        };

        Some(Distribution {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: total as f64 / sorted.len() as f64,
            p50: nearest_rank(50.0),
            p90: nearest_rank(90.0),
            p99: nearest_rank(99.0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWins {
    pub name: String,
    pub wins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub seed: String,
    pub games: usize,
    pub wins: Vec<PlayerWins>,
    pub stalemates: usize,
    pub timeouts: usize,
    pub rounds: Option<Distribution>,
    pub wars: Option<Distribution>,
    pub elapsed_ms: u128,
}

fn play_one(options: &SimulationOptions, index: usize) -> Result<GameOutcome> {
    let result = run_game(&options.game_options(index))?;
    Ok(GameOutcome {
        winner: result.state.winner.map(|id| id.index()),
        end_reason: result.end_reason,
        rounds: result.state.round.saturating_sub(1),
        wars: result.state.stats.wars,
    })
}

/// Run `options.games` games in parallel and aggregate them in game order
pub fn simulate(options: &SimulationOptions) -> Result<SimulationSummary> {
    if options.games == 0 {
        return Err(WarError::InvalidState("--games must be at least 1".to_string()));
    }

    let start = Instant::now();
    let outcomes = (0..options.games)
        .into_par_iter()
        .map(|index| play_one(options, index))
        .collect::<Result<Vec<_>>>()?;

    let names = options
        .player_names
        .clone()
        .unwrap_or_else(crate::game::default_player_names);
    let mut wins: Vec<PlayerWins> = names
        .into_iter()
        .map(|name| PlayerWins { name, wins: 0 })
        .collect();
    let mut stalemates = 0;
    let mut timeouts = 0;
    for outcome in &outcomes {
        match (outcome.end_reason, outcome.winner) {
            (Some(EndReason::Win), Some(winner)) => {
                if let Some(entry) = wins.get_mut(winner) {
                    entry.wins += 1;
                }
            }
            (Some(EndReason::Timeout), _) => timeouts += 1,
            _ => stalemates += 1,
        }
    }

    let rounds: Vec<u32> = outcomes.iter().map(|o| o.rounds).collect();
    let wars: Vec<u32> = outcomes.iter().map(|o| o.wars).collect();

    Ok(SimulationSummary {
        seed: options.seed.clone(),
        games: outcomes.len(),
        wins,
        stalemates,
        timeouts,
        rounds: Distribution::from_samples(&rounds),
        wars: Distribution::from_samples(&wars),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

fn distribution_line(label: &str, dist: &Distribution) -> String {
    format!(
        "{label}: min {} | p50 {} | p90 {} | p99 {} | max {} | mean {:.1}",
        dist.min, dist.p50, dist.p90, dist.p99, dist.max, dist.mean
    )
}

/// Print a human-readable report
pub fn log_summary(summary: &SimulationSummary, logger: &GameLogger) {
    logger.minimal("=== Simulation Complete ===");
    logger.minimal(&format!("Seed: {}", summary.seed));
    logger.minimal(&format!("Games played: {}", summary.games));
    let elapsed_secs = summary.elapsed_ms as f64 / 1000.0;
    if elapsed_secs > 0.0 {
        logger.normal(&format!(
            "Elapsed time: {elapsed_secs:.2}s ({:.1} games/s)",
            summary.games as f64 / elapsed_secs
        ));
    }

    logger.minimal("");
    logger.minimal("=== Results ===");
    for entry in &summary.wins {
        logger.minimal(&format!(
            "{} wins: {} ({:.1}%)",
            entry.name,
            entry.wins,
            percent(entry.wins, summary.games)
        ));
    }
    logger.minimal(&format!(
        "Stalemates: {} ({:.1}%)",
        summary.stalemates,
        percent(summary.stalemates, summary.games)
    ));
    logger.minimal(&format!(
        "Timeouts: {} ({:.1}%)",
        summary.timeouts,
        percent(summary.timeouts, summary.games)
    ));

    if let Some(rounds) = &summary.rounds {
        logger.normal(&distribution_line("Rounds", rounds));
    }
    if let Some(wars) = &summary.wars {
        logger.normal(&distribution_line("Wars", wars));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::VerbosityLevel;

    #[test]
    fn test_nearest_rank_percentiles() {
        let samples: Vec<u32> = (1..=100).collect();
        let dist = Distribution::from_samples(&samples).unwrap();
        assert_eq!(dist.min, 1);
        assert_eq!(dist.max, 100);
        assert_eq!(dist.p50, 50);
        assert_eq!(dist.p90, 90);
        assert_eq!(dist.p99, 99);
        assert!((dist.mean - 50.5).abs() < f64::EPSILON);

        let single = Distribution::from_samples(&[7]).unwrap();
        assert_eq!((single.p50, single.p99), (7, 7));
        assert!(Distribution::from_samples(&[]).is_none());
    }

    #[test]
    fn test_outcomes_add_up() {
        let summary = simulate(&SimulationOptions::new(12, "batch")).unwrap();
        let wins: usize = summary.wins.iter().map(|w| w.wins).sum();
        assert_eq!(summary.games, 12);
        assert_eq!(wins + summary.stalemates + summary.timeouts, 12);
        assert!(summary.rounds.is_some());
    }

    #[test]
    fn test_batch_is_reproducible() {
        let mut options = SimulationOptions::new(8, "repeat");
        options.rules = WarRulesInput::new().max_rounds(200);
        let mut a = simulate(&options).unwrap();
        let mut b = simulate(&options).unwrap();
        a.elapsed_ms = 0;
        b.elapsed_ms = 0;
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_games_rejected() {
        assert!(simulate(&SimulationOptions::new(0, "none")).is_err());
    }

    #[test]
    fn test_summary_report() {
        let summary = simulate(&SimulationOptions::new(4, "report")).unwrap();
        let logger = GameLogger::capturing(VerbosityLevel::Minimal);
        log_summary(&summary, &logger);
        let lines = logger.visible_lines();
        assert_eq!(lines[0], "=== Simulation Complete ===");
        assert!(lines.iter().any(|l| l.starts_with("Player 1 wins: ")));
        assert!(lines.iter().any(|l| l.starts_with("Timeouts: ")));
    }
}
