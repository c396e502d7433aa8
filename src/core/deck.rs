//! Deck construction and shuffling

use crate::core::{create_seeded_rng, Card, RandomSource, Rank, Suit};
use crate::{Result, WarError};

pub const CARDS_PER_DECK: usize = 52;

/// Build `num_decks` standard decks in construction order
///
/// For each deck copy, for each suit in [`Suit::ALL`] order, ranks ascend
/// from 2 to Ace.
pub fn create_deck(num_decks: u32) -> Result<Vec<Card>> {
    if num_decks < 1 {
        return Err(WarError::InvalidDeck("numDecks must be at least 1".to_string()));
    }

    let mut deck = Vec::with_capacity(CARDS_PER_DECK * num_decks as usize);
    for _ in 0..num_decks {
        for suit in Suit::ALL {
            for rank in Rank::all() {
                deck.push(Card::new(rank, suit));
            }
        }
    }
    Ok(deck)
}

/// Fisher-Yates shuffle returning a new sequence
///
/// Walks from the last index down to 1, swapping with
/// `floor(rng() * (i + 1))`. The walk direction and index convention are
/// part of the replay contract.
pub fn shuffle_deck<R>(cards: &[Card], rng: &mut R) -> Vec<Card>
where
    R: RandomSource + ?Sized,
{
    let mut result = cards.to_vec();
    for i in (1..result.len()).rev() {
        let j = ((rng.next_unit() * (i + 1) as f64).floor() as usize).min(i);
        result.swap(i, j);
    }
    result
}

/// Seeded convenience: new RNG, build, shuffle
pub fn create_shuffled_deck(seed: &str, num_decks: u32) -> Result<Vec<Card>> {
    let mut rng = create_seeded_rng(seed);
    let deck = create_deck(num_decks)?;
    Ok(shuffle_deck(&deck, &mut rng))
}
