//! Deterministic state hashing for trace verification
//!
//! A state is reduced to a canonical JSON snapshot (round plus per-player
//! piles) and digested with SHA-256. `counts` mode keeps only pile lengths;
//! `full` mode keeps every card in pile order, so reordering a pile changes
//! the digest even when the counts match.

use crate::core::{Card, PlayerState};
use crate::game::GameState;
use crate::{Result, WarError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// What a hash covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    Counts,
    Full,
}

impl HashMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HashMode::Counts => "counts",
            HashMode::Full => "full",
        }
    }
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-round hashing switch passed to the round engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateHashMode {
    #[default]
    Off,
    Counts,
    Full,
}

impl StateHashMode {
    /// The hash mode to emit, or `None` when hashing is off
    pub fn active(self) -> Option<HashMode> {
        match self {
            StateHashMode::Off => None,
            StateHashMode::Counts => Some(HashMode::Counts),
            StateHashMode::Full => Some(HashMode::Full),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateHashMode::Off => "off",
            StateHashMode::Counts => "counts",
            StateHashMode::Full => "full",
        }
    }
}

impl fmt::Display for StateHashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateHashMode {
    type Err = WarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(StateHashMode::Off),
            "counts" => Ok(StateHashMode::Counts),
            "full" => Ok(StateHashMode::Full),
            _ => Err(WarError::InvalidRules(
                "stateHashMode must be one of: off, counts, full".to_string(),
            )),
        }
    }
}

// Field order below is the canonical byte order of the snapshot.

#[derive(Serialize)]
struct CountsEntry {
    id: usize,
    draw: usize,
    won: usize,
}

#[derive(Serialize)]
struct FullEntry {
    id: usize,
    draw: Vec<String>,
    won: Vec<String>,
}

#[derive(Serialize)]
struct CanonicalState<T> {
    round: u32,
    players: Vec<T>,
}

fn card_keys<'a>(cards: impl Iterator<Item = &'a Card>) -> Vec<String> {
    cards.map(Card::key).collect()
}

/// Canonical snapshot JSON for `players` tagged with `round`
pub fn canonical_snapshot(players: &[PlayerState], round: u32, mode: HashMode) -> Result<String> {
    let json = match mode {
        HashMode::Counts => serde_json::to_string(&CanonicalState {
            round,
            players: players
                .iter()
                .enumerate()
                .map(|(id, p)| CountsEntry {
                    id,
                    draw: p.draw_pile.len(),
                    won: p.won_pile.len(),
                })
                .collect(),
        })?,
        HashMode::Full => serde_json::to_string(&CanonicalState {
            round,
            players: players
                .iter()
                .enumerate()
                .map(|(id, p)| FullEntry {
                    id,
                    draw: card_keys(p.draw_pile.iter()),
                    won: card_keys(p.won_pile.iter()),
                })
                .collect(),
        })?,
    };
    Ok(json)
}

/// Hash `state` as if its round counter were `round`
pub fn hash_state_at(state: &GameState, round: u32, mode: HashMode) -> Result<String> {
    let canonical = canonical_snapshot(&state.players, round, mode)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Hex SHA-256 digest of the canonical snapshot of `state`
pub fn hash_state(state: &GameState, mode: HashMode) -> Result<String> {
    hash_state_at(state, state.round, mode)
}

/// Format a hash for display (first 8 hex digits)
pub fn format_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
