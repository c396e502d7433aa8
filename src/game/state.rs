//! Main game state structure

use crate::core::{Card, PlayerId, PlayerState};
use crate::game::rules::{validate_war_rules, WarRules, WarRulesInput};
use crate::{Result, WarError};
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// A card placed on the table while a round resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCard {
    pub player_id: PlayerId,
    pub card: Card,
    pub face_down: bool,
}

/// Cards in play for the current round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub battle_cards: Vec<TableCard>,
    pub in_war: bool,
}

impl TableState {
    pub fn clear(&mut self) {
        self.battle_cards.clear();
        self.in_war = false;
    }
}

/// Lifetime counters; only ever increase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub wars: u32,
    pub flips: u32,
}

/// Complete game state
///
/// Rounds never mutate a caller's state: the engine resolves against a clone
/// and hands back a fresh value, so any snapshot can be replayed or branched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub players: Vec<PlayerState>,
    pub table: TableState,
    /// 1-based number of the next round to resolve
    pub round: u32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
    pub stats: GameStats,
    pub config: WarRules,
}

/// Inputs for [`create_game_state`]
#[derive(Debug, Clone, Default)]
pub struct GameStateOptions {
    /// Defaults to "Player 1" and "Player 2"
    pub player_names: Option<Vec<String>>,
    /// Dealt round-robin when present
    pub deck: Option<Vec<Card>>,
    pub rules: WarRulesInput,
}

pub fn default_player_names() -> Vec<String> {
    vec!["Player 1".to_string(), "Player 2".to_string()]
}

/// Deal `card[i]` to player `i % player_count`
fn deal_round_robin(deck: &[Card], player_count: usize) -> Vec<Vec<Card>> {
    let mut piles = vec![Vec::new(); player_count];
    for (index, card) in deck.iter().enumerate() {
        piles[index % player_count].push(*card);
    }
    piles
}

fn validate_player_names(names: &[String]) -> Result<()> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&names.len()) {
        return Err(WarError::InvalidPlayers(format!(
            "War needs {MIN_PLAYERS} to {MAX_PLAYERS} players, got {}",
            names.len()
        )));
    }
    if names.iter().any(|name| name.trim().is_empty()) {
        return Err(WarError::InvalidPlayers("player names must not be empty".to_string()));
    }
    Ok(())
}

/// Build the initial state: round 1, active, no winner, zeroed stats
pub fn create_game_state(options: GameStateOptions) -> Result<GameState> {
    let names = options.player_names.unwrap_or_else(default_player_names);
    validate_player_names(&names)?;
    let config = validate_war_rules(&options.rules)?;

    let piles = match options.deck {
        Some(deck) if !deck.is_empty() => deal_round_robin(&deck, names.len()),
        _ => vec![Vec::new(); names.len()],
    };

    let players = names
        .into_iter()
        .zip(piles)
        .map(|(name, pile)| PlayerState::with_piles(name, pile, []))
        .collect();

    Ok(GameState {
        players,
        table: TableState::default(),
        round: 1,
        active: true,
        winner: None,
        stats: GameStats::default(),
        config,
    })
}

impl GameState {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(id.index())
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id.index())
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.players.len()).map(PlayerId::new)
    }

    /// Players holding at least one card in either pile
    pub fn players_with_cards(&self) -> Vec<PlayerId> {
        self.player_ids()
            .filter(|id| self.players[id.index()].has_cards())
            .collect()
    }

    /// Display name, falling back to "Player N" for unknown ids
    pub fn player_name(&self, id: PlayerId) -> String {
        self.player(id)
            .map(|p| p.name.to_string())
            .unwrap_or_else(|| format!("Player {}", id.index() + 1))
    }

    /// Every card in the game: both piles of every player plus the table
    pub fn total_cards(&self) -> usize {
        self.players.iter().map(PlayerState::total_cards).sum::<usize>() + self.table.battle_cards.len()
    }
}
