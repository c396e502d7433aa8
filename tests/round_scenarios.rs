//! Hand-built round scenarios
//!
//! Each test sets up exact piles, plays one round and checks the resulting
//! piles, stats and events.

use war_forge_rs::core::{create_seeded_rng, Card, PlayerId, PlayerState, Rank, Suit};
use war_forge_rs::game::{
    create_game_state, play_round, CollectMode, EndReason, GameState, GameStateOptions, RoundEvent,
    StateHashMode, TieResolution, WarRulesInput,
};

fn card(rank: u8, suit: Suit) -> Card {
    Card::new(Rank::new(rank).unwrap(), suit)
}

/// One `(draw_pile, won_pile)` per player
fn state_with(piles: &[(&[Card], &[Card])], rules: WarRulesInput) -> GameState {
    let names: Vec<String> = (1..=piles.len()).map(|i| format!("P{i}")).collect();
    let mut state = create_game_state(GameStateOptions {
        player_names: Some(names.clone()),
        rules,
        ..Default::default()
    })
    .unwrap();
    state.players = names
        .into_iter()
        .zip(piles)
        .map(|(name, (draw, won))| PlayerState::with_piles(name, draw.iter().copied(), won.iter().copied()))
        .collect();
    state
}

fn kinds(events: &[RoundEvent]) -> Vec<&'static str> {
    events.iter().map(RoundEvent::kind).collect()
}

#[test]
fn test_single_war_awards_all_six_cards() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(6, Spades), card(2, Spades), card(9, Spades)], &[]),
            (&[card(6, Hearts), card(3, Hearts), card(4, Hearts)], &[]),
        ],
        WarRulesInput::new(),
    );
    let result = play_round(&state, &mut create_seeded_rng("war"), StateHashMode::Off).unwrap();
    let next = &result.state;

    assert_eq!(next.stats.wars, 1);
    assert_eq!(next.stats.flips, 4);
    assert_eq!(next.players[0].won_pile.len(), 6);
    assert_eq!(next.players[1].total_cards(), 0);
    assert_eq!(next.winner, Some(PlayerId::new(0)));
    assert_eq!(
        kinds(&result.events),
        ["RoundStarted", "WarStarted", "CardsPlaced", "TrickWon", "GameEnded"]
    );
}

#[test]
fn test_three_player_war_between_tied_leaders() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(7, Spades), card(4, Spades), card(14, Clubs)], &[]),
            (&[card(7, Hearts), card(3, Hearts), card(13, Diamonds)], &[]),
            (&[card(4, Diamonds), card(9, Diamonds), card(5, Spades)], &[]),
        ],
        WarRulesInput::new(),
    );
    let result = play_round(&state, &mut create_seeded_rng("three"), StateHashMode::Off).unwrap();
    let next = &result.state;

    assert_eq!(next.players[0].won_pile.len(), 7);
    assert_eq!(next.players[1].total_cards(), 0);
    assert_eq!(next.players[2].total_cards(), 2);
    assert!(next.active, "two players still hold cards");
    assert_eq!(next.total_cards(), 9);

    let war = result.events.iter().find_map(|e| match e {
        RoundEvent::WarStarted { war_level, participants } => Some((*war_level, participants.to_vec())),
        _ => None,
    });
    assert_eq!(war, Some((1, vec![PlayerId::new(0), PlayerId::new(1)])));
}

#[test]
fn test_player_who_runs_dry_in_war_loses_it() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(5, Spades)], &[]),
            (&[card(5, Hearts), card(2, Hearts), card(9, Hearts)], &[]),
        ],
        WarRulesInput::new(),
    );
    let result = play_round(&state, &mut create_seeded_rng("dry"), StateHashMode::Off).unwrap();

    assert_eq!(result.state.winner, Some(PlayerId::new(1)));
    assert_eq!(result.end_reason(), Some(EndReason::Win));
    assert_eq!(result.state.players[1].won_pile.len(), 4);
}

#[test]
fn test_won_pile_recycled_in_order_without_shuffle() {
    use Suit::*;
    let state = state_with(
        &[
            (&[], &[card(13, Spades), card(2, Clubs)]),
            (&[card(5, Hearts), card(6, Hearts)], &[]),
        ],
        WarRulesInput::new().shuffle_won_pile_on_recycle(false),
    );
    let result = play_round(&state, &mut create_seeded_rng("recycle"), StateHashMode::Off).unwrap();

    assert_eq!(
        result.events[1],
        RoundEvent::PileRecycled {
            player_id: PlayerId::new(0),
            cards: 2,
            shuffled: false,
        }
    );
    // King came off the recycled pile first and won the trick
    assert_eq!(result.state.players[0].draw_pile, [card(2, Clubs)]);
    assert_eq!(result.state.players[0].won_pile, vec![card(13, Spades), card(5, Hearts)]);
    assert!(result.state.active);
}

#[test]
fn test_sudden_death_skips_face_down_cards() {
    use Suit::*;
    let p1: &[Card] = &[card(8, Spades), card(3, Spades), card(11, Spades)];
    let p2: &[Card] = &[card(8, Hearts), card(12, Hearts), card(2, Hearts)];

    let sudden = state_with(
        &[(p1, &[]), (p2, &[])],
        WarRulesInput::new().tie_resolution(TieResolution::SuddenDeath),
    );
    let result = play_round(&sudden, &mut create_seeded_rng("sd"), StateHashMode::Off).unwrap();
    assert_eq!(result.state.players[1].won_pile.len(), 4);
    assert_eq!(result.state.stats.flips, 4);
    assert!(result.state.active);

    let standard = state_with(&[(p1, &[]), (p2, &[])], WarRulesInput::new());
    let result = play_round(&standard, &mut create_seeded_rng("sd"), StateHashMode::Off).unwrap();
    assert_eq!(result.state.players[0].won_pile.len(), 6);
    assert_eq!(result.state.winner, Some(PlayerId::new(0)));
}

#[test]
fn test_bottom_of_draw_keeps_won_pile_empty() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(10, Spades), card(2, Spades)], &[]),
            (&[card(5, Diamonds), card(3, Diamonds)], &[]),
        ],
        WarRulesInput::new().collect_mode(CollectMode::BottomOfDraw),
    );
    let result = play_round(&state, &mut create_seeded_rng("bottom"), StateHashMode::Off).unwrap();
    assert_eq!(
        result.state.players[0].draw_pile,
        [card(2, Spades), card(10, Spades), card(5, Diamonds)]
    );
    assert!(result.state.players[0].won_pile.is_empty());
}

#[test]
fn test_lone_holder_wins_immediately() {
    let state = state_with(&[(&[], &[]), (&[card(4, Suit::Clubs)], &[])], WarRulesInput::new());
    let result = play_round(&state, &mut create_seeded_rng("solo"), StateHashMode::Counts).unwrap();

    assert_eq!(kinds(&result.events), ["RoundStarted", "GameEnded", "StateHashed"]);
    assert_eq!(result.state.winner, Some(PlayerId::new(1)));
    assert_eq!(result.state.round, 2);
    assert_eq!(result.state.players[1].draw_pile.len(), 1);
}

#[test]
fn test_round_cap_reached_is_timeout() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(9, Spades), card(9, Clubs)], &[]),
            (&[card(3, Hearts), card(3, Clubs)], &[]),
        ],
        WarRulesInput::new().max_rounds(2),
    );
    let mut rng = create_seeded_rng("cap");
    let first = play_round(&state, &mut rng, StateHashMode::Off).unwrap();
    assert!(first.state.active);
    let second = play_round(&first.state, &mut rng, StateHashMode::Off).unwrap();

    // Player 1 takes both tricks, so the cap never comes into play
    assert_eq!(second.end_reason(), Some(EndReason::Win));

    let state = state_with(
        &[
            (&[card(9, Spades), card(3, Clubs), card(4, Clubs)], &[]),
            (&[card(3, Hearts), card(9, Clubs), card(5, Clubs)], &[]),
        ],
        WarRulesInput::new().max_rounds(2),
    );
    let first = play_round(&state, &mut rng, StateHashMode::Off).unwrap();
    let second = play_round(&first.state, &mut rng, StateHashMode::Off).unwrap();
    assert_eq!(second.end_reason(), Some(EndReason::Timeout));
    assert_eq!(second.state.winner, None);
    assert_eq!(second.state.round, 3);
}

#[test]
fn test_conservation_across_a_war() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(12, Spades), card(2, Spades), card(12, Clubs), card(7, Spades), card(8, Spades)], &[]),
            (&[card(12, Hearts), card(4, Hearts), card(12, Diamonds), card(5, Hearts), card(3, Hearts)], &[]),
        ],
        WarRulesInput::new(),
    );
    let result = play_round(&state, &mut create_seeded_rng("double"), StateHashMode::Off).unwrap();
    assert_eq!(result.state.stats.wars, 2);
    assert_eq!(result.state.total_cards(), state.total_cards());
    assert_eq!(result.state.players[0].won_pile.len(), 10);
}

#[test]
fn test_player_without_cards_sits_out_later_rounds() {
    use Suit::*;
    let mut state = state_with(
        &[
            (&[card(9, Spades), card(3, Spades)], &[]),
            (&[], &[]),
            (&[card(4, Diamonds), card(8, Diamonds)], &[]),
        ],
        WarRulesInput::new(),
    );
    let mut rng = create_seeded_rng("sit-out");

    for expected_winner in [0, 2] {
        let result = play_round(&state, &mut rng, StateHashMode::Off).unwrap();
        let (cards, participants) = result
            .events
            .iter()
            .find_map(|e| match e {
                RoundEvent::CardsPlaced { cards, participants } => Some((cards.clone(), participants.to_vec())),
                _ => None,
            })
            .unwrap();

        assert_eq!(participants, vec![PlayerId::new(0), PlayerId::new(2)]);
        assert!(cards.iter().all(|c| c.player_id != PlayerId::new(1)));
        assert!(result.events.iter().any(|e| matches!(
            e,
            RoundEvent::TrickWon { winner, .. } if *winner == PlayerId::new(expected_winner)
        )));
        assert_eq!(result.state.players[1].total_cards(), 0);
        assert!(result.state.active);
        state = result.state;
    }

    assert_eq!(state.players[0].won_pile, vec![card(9, Spades), card(4, Diamonds)]);
    assert_eq!(state.players[2].won_pile, vec![card(3, Spades), card(8, Diamonds)]);
    assert!(state.players[0].draw_pile.is_empty());
    assert!(state.players[2].draw_pile.is_empty());
}

#[test]
fn test_no_recycle_while_draw_pile_has_cards() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(13, Spades), card(2, Spades)], &[card(5, Clubs)]),
            (&[card(3, Hearts), card(4, Hearts)], &[]),
        ],
        WarRulesInput::new(),
    );
    let result = play_round(&state, &mut create_seeded_rng("no-recycle"), StateHashMode::Off).unwrap();

    assert_eq!(kinds(&result.events), ["RoundStarted", "CardsPlaced", "TrickWon"]);
    assert_eq!(
        result.state.players[0].won_pile,
        vec![card(5, Clubs), card(13, Spades), card(3, Hearts)]
    );
    assert_eq!(result.state.players[0].draw_pile, [card(2, Spades)]);
}

#[test]
fn test_shuffled_recycle_keeps_the_same_cards() {
    use Suit::*;
    let won = [card(13, Spades), card(12, Spades), card(11, Spades)];
    let state = state_with(
        &[(&[], &won), (&[card(2, Hearts), card(3, Hearts)], &[])],
        WarRulesInput::new().shuffle_won_pile_on_recycle(true),
    );
    let result = play_round(&state, &mut create_seeded_rng("shuffled"), StateHashMode::Off).unwrap();

    assert_eq!(
        result.events[1],
        RoundEvent::PileRecycled {
            player_id: PlayerId::new(0),
            cards: 3,
            shuffled: true,
        }
    );
    let player = &result.state.players[0];
    assert_eq!(player.draw_pile.len(), 2);
    assert_eq!(player.won_pile.len(), 2);
    assert_eq!(player.won_pile[1], card(2, Hearts));

    let mut held: Vec<Card> = player.draw_pile.iter().chain(&player.won_pile).copied().collect();
    held.sort_by_key(|c| (c.rank, c.suit as u8));
    let mut expected = vec![card(2, Hearts), won[0], won[1], won[2]];
    expected.sort_by_key(|c| (c.rank, c.suit as u8));
    assert_eq!(held, expected);
}

#[test]
fn test_recycle_while_drawing_war_ante() {
    use Suit::*;
    let state = state_with(
        &[
            (&[card(7, Spades)], &[card(2, Spades), card(14, Spades)]),
            (&[card(7, Hearts), card(3, Hearts), card(4, Hearts)], &[]),
        ],
        WarRulesInput::new().shuffle_won_pile_on_recycle(false),
    );
    let result = play_round(&state, &mut create_seeded_rng("ante"), StateHashMode::Off).unwrap();

    assert_eq!(
        kinds(&result.events),
        ["RoundStarted", "WarStarted", "PileRecycled", "CardsPlaced", "TrickWon", "GameEnded"]
    );
    assert_eq!(
        result.events[2],
        RoundEvent::PileRecycled {
            player_id: PlayerId::new(0),
            cards: 2,
            shuffled: false,
        }
    );
    let placed = result.events.iter().find_map(|e| match e {
        RoundEvent::CardsPlaced { cards, .. } => Some(cards.clone()),
        _ => None,
    });
    let face_down: Vec<Card> = placed
        .unwrap()
        .into_iter()
        .filter(|c| c.face_down)
        .map(|c| c.card)
        .collect();
    assert_eq!(face_down, vec![card(2, Spades), card(3, Hearts)]);
    assert_eq!(result.state.winner, Some(PlayerId::new(0)));
    assert_eq!(result.state.players[0].won_pile.len(), 6);
}
