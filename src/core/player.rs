//! Player pile state

use crate::core::{Card, PlayerName};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A player's piles
///
/// The front of `draw_pile` is the next card to play. `won_pile` keeps
/// collected cards in award order until it is recycled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub name: PlayerName,
    pub draw_pile: VecDeque<Card>,
    pub won_pile: Vec<Card>,
}

impl PlayerState {
    pub fn new(name: impl Into<PlayerName>) -> Self {
        PlayerState {
            name: name.into(),
            draw_pile: VecDeque::new(),
            won_pile: Vec::new(),
        }
    }

    pub fn with_piles(
        name: impl Into<PlayerName>,
        draw_pile: impl IntoIterator<Item = Card>,
        won_pile: impl IntoIterator<Item = Card>,
    ) -> Self {
        PlayerState {
            name: name.into(),
            draw_pile: draw_pile.into_iter().collect(),
            won_pile: won_pile.into_iter().collect(),
        }
    }

    /// Cards held across both piles
    pub fn total_cards(&self) -> usize {
        self.draw_pile.len() + self.won_pile.len()
    }

    pub fn has_cards(&self) -> bool {
        self.total_cards() > 0
    }

    /// Whether the next draw would need the won pile recycled first
    pub fn needs_recycle(&self) -> bool {
        self.draw_pile.is_empty() && !self.won_pile.is_empty()
    }
}
