//! Trace record types
//!
//! Every line of a trace file is one [`TraceRecord`], tagged by `type`.

use crate::core::{Card, PlayerId};
use crate::game::{GameState, RoundEvent, RoundResult, StateHashMode, WarRules};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TRACE_VERSION: &str = "1.0";
/// Bump together with the package version
pub const ENGINE_VERSION: &str = "0.1.0";

/// Header record: everything needed to re-run the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceMetaRecord {
    pub version: String,
    pub engine_version: String,
    /// RFC 3339 UTC
    pub timestamp: String,
    pub seed: String,
    pub rules: WarRules,
    /// Free-form record of how the game was launched
    #[serde(default)]
    pub cli_args: Map<String, Value>,
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_hash_mode: Option<StateHashMode>,
}

impl TraceMetaRecord {
    /// Hash mode the trace was recorded with (`off` when absent)
    pub fn hash_mode(&self) -> StateHashMode {
        self.state_hash_mode.unwrap_or_default()
    }
}

/// One round event, tagged with the round it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEventRecord {
    pub round: u32,
    pub event: RoundEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPileCount {
    pub player_id: PlayerId,
    pub draw: usize,
    pub won: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PileKind {
    Draw,
    Won,
}

/// Front card of one non-empty pile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTopCard {
    pub player_id: PlayerId,
    pub pile: PileKind,
    pub card: Card,
}

/// Pile sizes after a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSnapshotRecord {
    pub round: u32,
    pub pile_counts: Vec<SnapshotPileCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_cards: Option<Vec<SnapshotTopCard>>,
}

impl TraceSnapshotRecord {
    pub fn capture(round: u32, state: &GameState, include_top_cards: bool) -> Self {
        let pile_counts = state
            .player_ids()
            .zip(&state.players)
            .map(|(player_id, player)| SnapshotPileCount {
                player_id,
                draw: player.draw_pile.len(),
                won: player.won_pile.len(),
            })
            .collect();

        let top_cards = if include_top_cards {
            let mut cards = Vec::new();
            for (player_id, player) in state.player_ids().zip(&state.players) {
                if let Some(card) = player.draw_pile.front() {
                    cards.push(SnapshotTopCard {
                        player_id,
                        pile: PileKind::Draw,
                        card: *card,
                    });
                }
                if let Some(card) = player.won_pile.first() {
                    cards.push(SnapshotTopCard {
                        player_id,
                        pile: PileKind::Won,
                        card: *card,
                    });
                }
            }
            Some(cards).filter(|cards| !cards.is_empty())
        } else {
            None
        };

        TraceSnapshotRecord {
            round,
            pile_counts,
            top_cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TraceRecord {
    Meta(TraceMetaRecord),
    Event(TraceEventRecord),
    Snapshot(TraceSnapshotRecord),
}

/// Build the meta record for a freshly created game
pub fn create_trace_meta(
    seed: &str,
    state: &GameState,
    cli_args: Map<String, Value>,
    state_hash_mode: Option<StateHashMode>,
) -> TraceMetaRecord {
    TraceMetaRecord {
        version: TRACE_VERSION.to_string(),
        engine_version: ENGINE_VERSION.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        seed: seed.to_string(),
        rules: state.config.clone(),
        cli_args,
        players: state.players.iter().map(|p| p.name.to_string()).collect(),
        max_rounds: state.config.max_rounds,
        state_hash_mode,
    }
}

/// Event records for one round, all tagged with its round number
pub fn event_records(result: &RoundResult) -> impl Iterator<Item = TraceEventRecord> + '_ {
    let round = result.round_number();
    result
        .events
        .iter()
        .cloned()
        .map(move |event| TraceEventRecord { round, event })
}
