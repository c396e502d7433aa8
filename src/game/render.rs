//! Human-readable rendering of round events
//!
//! Each event maps to zero or more lines tagged with the verbosity level
//! they belong to. Callers hand the lines to a [`GameLogger`], which decides
//! what is actually shown.

use crate::core::{Card, PlayerId};
use crate::game::events::{EndReason, RoundEvent};
use crate::game::logger::{GameLogger, VerbosityLevel};
use crate::game::state::{GameState, TableCard};
use std::collections::BTreeMap;

/// One rendered line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub level: VerbosityLevel,
    pub text: String,
}

impl RenderedLine {
    fn new(level: VerbosityLevel, text: impl Into<String>) -> Self {
        RenderedLine {
            level,
            text: text.into(),
        }
    }
}

pub fn format_card(card: &Card) -> String {
    card.to_string()
}

/// Face-down cards are hidden as `??`
pub fn format_table_card(entry: &TableCard) -> String {
    if entry.face_down {
        "??".to_string()
    } else {
        format_card(&entry.card)
    }
}

/// Name for `id`, or "Player N" when the list has no entry for it
pub fn player_label(names: &[String], id: PlayerId) -> String {
    names
        .get(id.index())
        .cloned()
        .unwrap_or_else(|| format!("Player {}", id.index() + 1))
}

/// Player names in seat order
pub fn player_names(state: &GameState) -> Vec<String> {
    state.players.iter().map(|p| p.name.to_string()).collect()
}

/// "{name} played: ..." per player, in seat order
fn render_cards_placed(names: &[String], cards: &[TableCard]) -> Vec<RenderedLine> {
    let mut grouped: BTreeMap<PlayerId, Vec<String>> = BTreeMap::new();
    for entry in cards {
        grouped
            .entry(entry.player_id)
            .or_default()
            .push(format_table_card(entry));
    }
    grouped
        .into_iter()
        .map(|(id, labels)| {
            RenderedLine::new(
                VerbosityLevel::Normal,
                format!("{} played: {}", player_label(names, id), labels.join(", ")),
            )
        })
        .collect()
}

/// The closing line for a finished game
pub fn ending_message(names: &[String], reason: EndReason, winner: Option<PlayerId>) -> String {
    match (reason, winner) {
        (EndReason::Win, Some(winner)) => format!("{} wins the game!", player_label(names, winner)),
        (EndReason::Timeout, _) => "Game ended due to max rounds timeout.".to_string(),
        _ => "Game ended in a stalemate.".to_string(),
    }
}

pub fn render_event(names: &[String], event: &RoundEvent) -> Vec<RenderedLine> {
    match event {
        RoundEvent::RoundStarted { round } => {
            vec![RenderedLine::new(VerbosityLevel::Normal, format!("Round {round}"))]
        }
        RoundEvent::PileRecycled {
            player_id,
            cards,
            shuffled,
        } => {
            let action = if *shuffled { "shuffled" } else { "recycled" };
            vec![RenderedLine::new(
                VerbosityLevel::Normal,
                format!(
                    "{} {action} {cards} card(s) from the won pile.",
                    player_label(names, *player_id)
                ),
            )]
        }
        RoundEvent::WarStarted { war_level, .. } => {
            vec![RenderedLine::new(VerbosityLevel::Normal, format!("WAR! (level {war_level})"))]
        }
        RoundEvent::CardsPlaced { cards, .. } => render_cards_placed(names, cards),
        RoundEvent::TrickWon { winner, collected } => vec![RenderedLine::new(
            VerbosityLevel::Normal,
            format!(
                "{} wins the trick and collects {} card(s).",
                player_label(names, *winner),
                collected.len()
            ),
        )],
        RoundEvent::StateHashed { round, mode, hash } => vec![RenderedLine::new(
            VerbosityLevel::Verbose,
            format!("State hash ({mode}) [round {round}]: {hash}"),
        )],
        RoundEvent::GameEnded { reason, winner } => {
            vec![RenderedLine::new(VerbosityLevel::Minimal, ending_message(names, *reason, *winner))]
        }
    }
}

pub fn render_round_events(names: &[String], events: &[RoundEvent]) -> Vec<RenderedLine> {
    events.iter().flat_map(|event| render_event(names, event)).collect()
}

/// Render `events` straight into `logger`
pub fn log_round_events(logger: &GameLogger, names: &[String], events: &[RoundEvent]) {
    for line in render_round_events(names, events) {
        logger.log(line.level, &line.text, Some("round"));
    }
}

/// Round, war and flip counters plus every player's pile sizes
pub fn render_stats(state: &GameState) -> Vec<String> {
    let mut lines = vec![
        format!("Round: {}", state.round),
        format!("Wars: {} | Flips: {}", state.stats.wars, state.stats.flips),
    ];
    lines.extend(state.players.iter().map(|player| {
        format!(
            "{}: draw pile {}, won pile {}, total {}",
            player.name,
            player.draw_pile.len(),
            player.won_pile.len(),
            player.total_cards()
        )
    }));
    lines
}
