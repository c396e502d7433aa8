//! Trace replay, verification and viewing
//!
//! Replays never trust the recorded events for game logic: the game is
//! regenerated from the meta record (seed, rules, players) and the recorded
//! events are only compared against it or rendered.

use crate::core::PlayerId;
use crate::game::render::{player_label, render_event, render_round_events};
use crate::game::{
    create_game, play_round, EndReason, GameLogger, RoundEvent, RoundResult, RunGameOptions,
    StateHashMode, WarRulesInput,
};
use crate::playback::{compute_playback_delay_ms, has_war_event, DEFAULT_PLAYBACK_DELAY_MS};
use crate::trace::reader::{read_trace_file, read_trace_file_async, LoadedTrace};
use crate::trace::record::{event_records, TraceEventRecord, TraceMetaRecord, TraceRecord};
use crate::trace::TraceError;
use crate::{Result, WarError};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Which events `view_trace` shows (`GameEnded` is always shown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFilter {
    /// Everything except `RoundStarted`
    #[default]
    All,
    Wars,
    Wins,
    Recycles,
}

impl TraceFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TraceFilter::All => "all",
            TraceFilter::Wars => "wars",
            TraceFilter::Wins => "wins",
            TraceFilter::Recycles => "recycles",
        }
    }

    pub fn matches(self, event: &RoundEvent) -> bool {
        match (self, event) {
            (_, RoundEvent::GameEnded { .. }) => true,
            (TraceFilter::All, event) => !matches!(event, RoundEvent::RoundStarted { .. }),
            (TraceFilter::Wars, event) => event.is_war(),
            (TraceFilter::Wins, event) => matches!(event, RoundEvent::TrickWon { .. }),
            (TraceFilter::Recycles, event) => matches!(event, RoundEvent::PileRecycled { .. }),
        }
    }
}

impl fmt::Display for TraceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraceFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(TraceFilter::All),
            "wars" => Ok(TraceFilter::Wars),
            "wins" => Ok(TraceFilter::Wins),
            "recycles" => Ok(TraceFilter::Recycles),
            _ => Err("--only must be one of: all, wars, wins, recycles.".to_string()),
        }
    }
}

/// Headline numbers for a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceSummary {
    pub war_count: usize,
    pub recycle_count: usize,
    /// Reason and winner of the last `GameEnded` event
    pub ending: Option<(EndReason, Option<PlayerId>)>,
    /// Highest round number recorded (0 for an empty trace)
    pub round_count: u32,
}

pub fn summarize_trace(trace: &LoadedTrace) -> TraceSummary {
    let war_count = trace.events.iter().filter(|r| r.event.is_war()).count();
    let recycle_count = trace
        .events
        .iter()
        .filter(|r| matches!(r.event, RoundEvent::PileRecycled { .. }))
        .count();
    let ending = trace.events.iter().rev().find_map(|r| r.event.ending());
    let round_count = trace.rounds().last().copied().unwrap_or(0);

    TraceSummary {
        war_count,
        recycle_count,
        ending,
        round_count,
    }
}

fn run_options(meta: &TraceMetaRecord) -> RunGameOptions {
    RunGameOptions::new(meta.seed.clone())
        .player_names(meta.players.clone())
        .rules(WarRulesInput::from(&meta.rules))
}

/// Re-run the game described by `meta`, one result per round
pub fn generate_round_results(meta: &TraceMetaRecord, hash_mode: StateHashMode) -> Result<Vec<RoundResult>> {
    let (mut state, mut rng) = create_game(&run_options(meta))?;

    let mut results = Vec::new();
    while state.active {
        let result = play_round(&state, &mut rng, hash_mode)?;
        state = result.state.clone();
        results.push(result);
    }
    Ok(results)
}

/// Round-tagged event records, in order
pub fn flatten_round_results(rounds: &[RoundResult]) -> Vec<TraceEventRecord> {
    rounds.iter().flat_map(event_records).collect()
}

/// The record as its full trace line, `type` tag included
fn record_json(record: &TraceEventRecord) -> String {
    serde_json::to_string(&TraceRecord::Event(record.clone())).unwrap_or_else(|_| format!("{record:?}"))
}

/// Compare recorded events with a fresh run; fails on the first difference
///
/// `generated` may be supplied to avoid re-running the game; otherwise the
/// game is regenerated with the trace's own hash mode.
pub fn verify_trace_events(trace: &LoadedTrace, generated: Option<&[RoundResult]>) -> Result<()> {
    let regenerated;
    let rounds = match generated {
        Some(rounds) => rounds,
        None => {
            regenerated = generate_round_results(&trace.meta, trace.meta.hash_mode())?;
            regenerated.as_slice()
        }
    };
    let actual = flatten_round_results(rounds);

    if actual.len() != trace.events.len() {
        return Err(TraceError::LengthMismatch {
            expected: trace.events.len(),
            actual: actual.len(),
        }
        .into());
    }

    for (index, (expected, actual)) in trace.events.iter().zip(&actual).enumerate() {
        if expected != actual {
            return Err(TraceError::Mismatch {
                index: index + 1,
                expected: record_json(expected),
                actual: record_json(actual),
            }
            .into());
        }
    }
    Ok(())
}

fn group_by_round(events: &[TraceEventRecord]) -> BTreeMap<u32, Vec<RoundEvent>> {
    let mut grouped: BTreeMap<u32, Vec<RoundEvent>> = BTreeMap::new();
    for record in events {
        grouped.entry(record.round).or_default().push(record.event.clone());
    }
    grouped
}

/// Inclusive round window, defaulting to the trace's first and last rounds
fn round_window(rounds: &[u32], from: Option<u32>, to: Option<u32>) -> Result<(u32, u32)> {
    let from = from.or_else(|| rounds.first().copied()).unwrap_or(1);
    let to = to.or_else(|| rounds.last().copied()).unwrap_or(from);
    if from > to {
        return Err(WarError::InvalidState(
            "--from must be less than or equal to --to.".to_string(),
        ));
    }
    Ok((from, to))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub only: TraceFilter,
}

/// Render a trace summary plus the events of the selected rounds
pub fn render_trace_view(label: &str, trace: &LoadedTrace, options: &ViewOptions) -> Result<Vec<String>> {
    let players = &trace.meta.players;
    let summary = summarize_trace(trace);
    let rounds = trace.rounds();
    let (from, to) = round_window(&rounds, options.from, options.to)?;

    let mut lines = vec![
        format!("Trace: {label}"),
        format!("Seed: {}", trace.meta.seed),
        format!("Players: {}", players.join(" vs ")),
        format!(
            "Rounds recorded: {} | Wars: {} | Recycles: {}",
            summary.round_count, summary.war_count, summary.recycle_count
        ),
    ];
    if let Some((reason, winner)) = summary.ending {
        let ending = match (reason, winner) {
            (EndReason::Win, Some(winner)) => format!("{} won", player_label(players, winner)),
            (EndReason::Timeout, _) => "Timeout".to_string(),
            _ => "Stalemate".to_string(),
        };
        lines.push(format!("Ending: {ending}"));
    }
    lines.push(String::new());
    let filter_note = match options.only {
        TraceFilter::All => String::new(),
        other => format!(" (filter: {other})"),
    };
    lines.push(format!("Showing rounds {from} to {to}{filter_note}"));

    for (round, events) in group_by_round(&trace.events).range(from..=to) {
        lines.push(String::new());
        lines.push(format!("Round {round}"));
        for event in events.iter().filter(|event| options.only.matches(event)) {
            lines.extend(render_event(players, event).into_iter().map(|line| line.text));
        }
    }
    Ok(lines)
}

/// Print a trace summary through `logger`
pub fn view_trace<P: AsRef<Path>>(path: P, options: &ViewOptions, logger: &GameLogger) -> Result<()> {
    let path = path.as_ref();
    let trace = read_trace_file(path)?;
    for line in render_trace_view(&path.display().to_string(), &trace, options)? {
        logger.minimal(&line);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplayOptions {
    pub from: Option<u32>,
    pub to: Option<u32>,
    /// Playback speed multiplier
    pub speed: Option<f64>,
    /// Delay between rounds before speed scaling
    pub delay_ms: Option<f64>,
    pub pause_on_war: bool,
    /// Re-run the engine and fail on the first diverging event
    pub verify: bool,
}

/// Replay a trace round by round through `logger`
///
/// Line selection follows the logger's verbosity. `wait_for_continue` is
/// called with a prompt after every round containing a war when
/// `pause_on_war` is set.
pub async fn replay_trace<P, W>(
    path: P,
    options: &ReplayOptions,
    logger: &GameLogger,
    mut wait_for_continue: W,
) -> Result<()>
where
    P: AsRef<Path>,
    W: FnMut(&str) -> Result<()>,
{
    let trace = read_trace_file_async(path).await?;
    let players = &trace.meta.players;
    let round_results = generate_round_results(&trace.meta, trace.meta.hash_mode())?;
    if options.verify {
        verify_trace_events(&trace, Some(round_results.as_slice()))?;
        logger.minimal("Trace verification succeeded.");
    }

    let rounds = trace.rounds();
    let (from, to) = round_window(&rounds, options.from, options.to)?;
    let delay_ms = compute_playback_delay_ms(options.speed, options.delay_ms, DEFAULT_PLAYBACK_DELAY_MS);

    logger.minimal(&format!("Replaying trace for seed {}", trace.meta.seed));
    logger.minimal(&format!("Players: {}", players.join(" vs ")));
    let pause_label = if options.pause_on_war { " | pause on war" } else { "" };
    let speed_label = match options.speed {
        Some(speed) if speed != 1.0 => format!(" | speed x{speed}"),
        _ => String::new(),
    };
    let delay_label = if delay_ms > 0 {
        format!(" | {delay_ms}ms delay")
    } else {
        String::new()
    };
    logger.minimal(&format!("Rounds {from}-{to}{pause_label}{speed_label}{delay_label}"));

    for (round, events) in group_by_round(&trace.events).range(from..=to) {
        let regenerated = round_results.iter().any(|result| result.round_number() == *round);
        if !regenerated {
            logger.minimal(&format!(
                "Warning: no RoundResult found for round {round}; rendering recorded events only."
            ));
        }
        for line in render_round_events(players, events) {
            logger.log(line.level, &line.text, Some("replay"));
        }
        if options.pause_on_war && has_war_event(events) {
            wait_for_continue("War detected. Press Enter to continue...")?;
        }
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    logger.minimal("Replay complete.");
    Ok(())
}
