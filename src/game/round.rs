//! Round resolution engine
//!
//! [`play_round`] resolves exactly one round: the initial flip, any cascade
//! of wars among the tied-highest players, the trick award and the end-of-game
//! checks. It works on a private clone of the input state and returns the new
//! state together with the ordered events describing what happened.
//!
//! Draw order is fixed (active players in index order, each war package drawn
//! face-down cards first), so the same state and RNG stream always produce the
//! same result.

use crate::core::{shuffle_deck, PlayerId, RandomSource};
use crate::game::events::{EndReason, Participants, RoundEvent};
use crate::game::rules::{CollectMode, TieResolution};
use crate::game::state::{GameState, TableCard};
use crate::game::state_hash::{hash_state_at, StateHashMode};
use crate::{Result, WarError};

/// Output of one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub state: GameState,
    pub events: Vec<RoundEvent>,
}

impl RoundResult {
    /// The round these events belong to: the `RoundStarted` number, or the
    /// state's round for a round-cap short-circuit that never started
    pub fn round_number(&self) -> u32 {
        self.events
            .iter()
            .find_map(|event| match event {
                RoundEvent::RoundStarted { round } => Some(*round),
                _ => None,
            })
            .unwrap_or(self.state.round)
    }

    /// The `GameEnded` reason emitted by this round, if any
    pub fn end_reason(&self) -> Option<EndReason> {
        self.events.iter().find_map(|event| event.ending().map(|(reason, _)| reason))
    }
}

/// Mutable working set for a single round
struct RoundContext<'r, R: RandomSource + ?Sized> {
    state: GameState,
    rng: &'r mut R,
    events: Vec<RoundEvent>,
    current_round: u32,
    hash_mode: StateHashMode,
}

impl<'r, R: RandomSource + ?Sized> RoundContext<'r, R> {
    /// Move the won pile into an empty draw pile before a draw
    fn recycle_if_needed(&mut self, player_id: PlayerId) -> Result<()> {
        let shuffle = self.state.config.shuffle_won_pile_on_recycle;
        let player = self
            .state
            .players
            .get_mut(player_id.index())
            .ok_or_else(|| WarError::InvalidState(format!("unknown player {player_id}")))?;
        if !player.needs_recycle() {
            return Ok(());
        }

        let won = std::mem::take(&mut player.won_pile);
        let recycled = if shuffle {
            shuffle_deck(&won, &mut *self.rng)
        } else {
            won
        };
        let cards = recycled.len();
        player.draw_pile.extend(recycled);

        self.events.push(RoundEvent::PileRecycled {
            player_id,
            cards,
            shuffled: shuffle,
        });
        Ok(())
    }

    /// Draw one card onto the table; `None` when both piles are empty
    fn draw_to_table(&mut self, player_id: PlayerId, face_down: bool) -> Result<Option<TableCard>> {
        self.recycle_if_needed(player_id)?;
        let Some(card) = self.state.players[player_id.index()].draw_pile.pop_front() else {
            return Ok(None);
        };

        let table_card = TableCard {
            player_id,
            card,
            face_down,
        };
        self.state.table.battle_cards.push(table_card);
        if !face_down {
            self.state.stats.flips += 1;
        }
        Ok(Some(table_card))
    }

    /// Face-down ante (standard war only) then one face-up card
    fn draw_war_package(&mut self, player_id: PlayerId) -> Result<Option<TableCard>> {
        if self.state.config.tie_resolution == TieResolution::StandardWar {
            for _ in 0..self.state.config.war_face_down_count {
                self.draw_to_table(player_id, true)?;
            }
        }
        self.draw_to_table(player_id, false)
    }

    fn award_trick(&mut self, winner: PlayerId) {
        let cards = self.state.table.battle_cards.iter().map(|entry| entry.card);
        let player = &mut self.state.players[winner.index()];
        match self.state.config.collect_mode {
            CollectMode::BottomOfDraw => player.draw_pile.extend(cards),
            CollectMode::WonPile => player.won_pile.extend(cards),
        }
    }

    fn end_game(&mut self, reason: EndReason, winner: Option<PlayerId>) {
        self.state.active = false;
        self.state.winner = winner;
        self.events.push(RoundEvent::GameEnded { reason, winner });
    }

    /// Append `StateHashed` (when enabled) and hand back the round
    fn finish(mut self) -> Result<RoundResult> {
        if let Some(mode) = self.hash_mode.active() {
            let hash = hash_state_at(&self.state, self.current_round, mode)?;
            self.events.push(RoundEvent::StateHashed {
                round: self.current_round,
                mode,
                hash,
            });
        }
        Ok(RoundResult {
            state: self.state,
            events: self.events,
        })
    }
}

/// Players tied at the highest face-up rank
fn contenders(face_up: &[TableCard]) -> Participants {
    let Some(best) = face_up.iter().map(|entry| entry.card.rank).max() else {
        return Participants::new();
    };
    face_up
        .iter()
        .filter(|entry| entry.card.rank == best)
        .map(|entry| entry.player_id)
        .collect()
}

/// Resolve one round of War
///
/// A finished game is returned unchanged with no events. A game already past
/// its round cap ends with a single `GameEnded { timeout }` and no round is
/// played.
pub fn play_round<R>(state: &GameState, rng: &mut R, hash_mode: StateHashMode) -> Result<RoundResult>
where
    R: RandomSource + ?Sized,
{
    if !state.active {
        return Ok(RoundResult {
            state: state.clone(),
            events: Vec::new(),
        });
    }

    if state.players.is_empty() {
        return Err(WarError::InvalidState("game has no players".to_string()));
    }

    if let Some(max_rounds) = state.config.max_rounds {
        if state.round > max_rounds {
            let mut timed_out = state.clone();
            timed_out.active = false;
            return Ok(RoundResult {
                state: timed_out,
                events: vec![RoundEvent::GameEnded {
                    reason: EndReason::Timeout,
                    winner: None,
                }],
            });
        }
    }

    let current_round = state.round;
    let mut working = state.clone();
    working.table.clear();

    let mut ctx = RoundContext {
        state: working,
        rng,
        events: vec![RoundEvent::RoundStarted { round: current_round }],
        current_round,
        hash_mode,
    };

    let active: Participants = ctx.state.players_with_cards().into_iter().collect();
    match active.as_slice() {
        [] => {
            ctx.state.round += 1;
            ctx.end_game(EndReason::Stalemate, None);
            return ctx.finish();
        }
        [only] => {
            let only = *only;
            ctx.state.round += 1;
            ctx.end_game(EndReason::Win, Some(only));
            return ctx.finish();
        }
        _ => {}
    }

    // Initial flip. A player who somehow cannot produce a card sits out
    // this comparison but stays in the game.
    let mut face_up = Vec::with_capacity(active.len());
    for &player_id in &active {
        if let Some(card) = ctx.draw_to_table(player_id, false)? {
            face_up.push(card);
        }
    }

    let mut tied = contenders(&face_up);
    let mut war_level = 0;

    while tied.len() > 1 {
        war_level += 1;
        ctx.state.stats.wars += 1;
        ctx.state.table.in_war = true;
        ctx.events.push(RoundEvent::WarStarted {
            war_level,
            participants: tied.clone(),
        });

        let mut war_face_up = Vec::with_capacity(tied.len());
        for &player_id in &tied {
            if let Some(card) = ctx.draw_war_package(player_id)? {
                war_face_up.push(card);
            }
        }
        tied = contenders(&war_face_up);
    }

    let Some(&round_winner) = tied.first() else {
        // Everyone still in the war ran dry at once
        ctx.state.round += 1;
        ctx.end_game(EndReason::Stalemate, None);
        return ctx.finish();
    };

    ctx.award_trick(round_winner);
    let trick = std::mem::take(&mut ctx.state.table.battle_cards);
    ctx.state.table.clear();
    ctx.events.push(RoundEvent::CardsPlaced {
        cards: trick.clone(),
        participants: active,
    });
    ctx.events.push(RoundEvent::TrickWon {
        winner: round_winner,
        collected: trick,
    });

    ctx.state.round += 1;

    let remaining = ctx.state.players_with_cards();
    match remaining.as_slice() {
        [only] => {
            let only = *only;
            ctx.end_game(EndReason::Win, Some(only));
        }
        [] => ctx.end_game(EndReason::Stalemate, None),
        _ => {
            if let Some(max_rounds) = ctx.state.config.max_rounds {
                if ctx.state.round > max_rounds {
                    ctx.end_game(EndReason::Timeout, None);
                }
            }
        }
    }

    ctx.finish()
}
