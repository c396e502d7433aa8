//! Core card-game types: cards, decks, piles and the seeded RNG

pub mod card;
pub mod deck;
pub mod player;
pub mod rng;
pub mod types;

pub use card::{Card, Rank, Suit};
pub use deck::{create_deck, create_shuffled_deck, shuffle_deck, CARDS_PER_DECK};
pub use player::PlayerState;
pub use rng::{create_seeded_rng, RandomSource, SeededRng};
pub use types::{PlayerId, PlayerName};
