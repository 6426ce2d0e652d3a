//! Property tests for the round rules (pure engine, seeded where random).
//!
//! Properties tested:
//! - Drawing every card empties a deck, one more draw fails
//! - `standard` stops at the first repeated trap kind
//! - `first_trap_ends` stops at the first trap
//! - Treasure splits evenly, the remainder is lost
//! - A x1.0 multiplier leaves every treasure value untouched
//! - The leaderboard is sorted and stable for ties

use cavern_game::{
    Card, Deck, EndCondition, GameError, GemModifier, Leaderboard, PlayerId, PlayerInRound,
    PlayerKind, RELIC_GEM_VALUES, Round, RoundEffect, TREASURE_GEM_VALUES, TrapKind,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn card() -> impl Strategy<Value = Card> {
    prop_oneof![
        prop::sample::select(TREASURE_GEM_VALUES.to_vec()).prop_map(|gems| Card::Treasure { gems }),
        prop::sample::select(TrapKind::ALL.to_vec()).prop_map(Card::trap),
        prop::sample::select(RELIC_GEM_VALUES.to_vec()).prop_map(|gems| Card::Relic { gems }),
    ]
}

fn seats(count: usize) -> Vec<PlayerInRound> {
    (0..count)
        .map(|i| PlayerInRound::new(PlayerId(i), format!("P{i}"), PlayerKind::Human))
        .collect()
}

/// Play a round in which nobody ever leaves, returning the turns played.
fn play_without_exits(cards: Vec<Card>, condition: EndCondition) -> u32 {
    let mut players = seats(3);
    let effect = RoundEffect::new(condition, GemModifier::Standard);
    let mut round = Round::new(1, &mut players, Deck::new(cards), effect).unwrap();
    while round.has_next() {
        let mut turn = round.next_turn().unwrap();
        turn.execute_draw_phase().unwrap();
        turn.end_turn(&[]).unwrap();
    }
    round.end_round().unwrap().turns
}

proptest! {
    #[test]
    fn prop_drawing_every_card_empties_the_deck(cards in prop::collection::vec(card(), 0..40)) {
        let mut deck = Deck::new(cards.clone());
        for expected in &cards {
            prop_assert_eq!(deck.draw().unwrap(), *expected);
        }
        prop_assert!(!deck.has_next());
        prop_assert_eq!(deck.draw(), Err(GameError::EmptyDeck));
        prop_assert_eq!(deck.peek(), Err(GameError::EmptyDeck));
    }

    #[test]
    fn prop_standard_stops_at_the_first_repeated_trap(cards in prop::collection::vec(card(), 1..40)) {
        let mut seen = HashSet::new();
        let expected = cards
            .iter()
            .position(|card| card.trap_kind().is_some_and(|kind| !seen.insert(kind)))
            .map_or(cards.len(), |index| index + 1);
        let turns = play_without_exits(cards, EndCondition::Standard);
        prop_assert_eq!(turns as usize, expected);
    }

    #[test]
    fn prop_first_trap_ends_stops_at_any_trap(cards in prop::collection::vec(card(), 1..40)) {
        let expected = cards
            .iter()
            .position(|card| card.trap_kind().is_some())
            .map_or(cards.len(), |index| index + 1);
        let turns = play_without_exits(cards, EndCondition::FirstTrapEnds);
        prop_assert_eq!(turns as usize, expected);
    }

    #[test]
    fn prop_treasure_splits_evenly(
        gems in prop::sample::select(TREASURE_GEM_VALUES.to_vec()),
        count in 1usize..=8,
    ) {
        let mut players = seats(count);
        let deck = Deck::new(vec![Card::Treasure { gems }]);
        let mut round = Round::new(1, &mut players, deck, RoundEffect::default()).unwrap();
        let mut turn = round.next_turn().unwrap();
        turn.execute_draw_phase().unwrap();
        let share = gems / u32::try_from(count).unwrap();
        prop_assert!(turn.players().iter().all(|player| player.sack_gems() == share));
        prop_assert_eq!(turn.lost_gems(), gems % u32::try_from(count).unwrap());
    }

    #[test]
    fn prop_unit_multiplier_is_identity(
        gems in any::<u32>(),
        traps in prop::collection::vec(prop::sample::select(TrapKind::ALL.to_vec()), 0..12),
        leavers in 0usize..4,
    ) {
        let mut players = seats(4);
        let mut cards: Vec<Card> = traps.iter().copied().map(Card::trap).collect();
        cards.push(Card::Treasure { gems: 1 });
        let effect = RoundEffect::new(EndCondition::ThreeRelicsDrawn, GemModifier::Standard);
        let mut round = Round::new(1, &mut players, Deck::new(cards), effect).unwrap();
        for seat in 0..traps.len() {
            let mut turn = round.next_turn().unwrap();
            turn.execute_draw_phase().unwrap();
            let exiting = if seat < leavers { vec![PlayerId(seat)] } else { Vec::new() };
            turn.end_turn(&exiting).unwrap();
        }
        prop_assert!(round.has_next());
        let state = round.state();
        prop_assert_eq!(state.drawn_traps().len(), traps.len());
        prop_assert_eq!(GemModifier::gem_multiplier(1.0).apply(state, gems), gems);
    }

    #[test]
    fn prop_leaderboard_is_sorted_and_stable(chests in prop::collection::vec(0u32..60, 0..8)) {
        let players: Vec<PlayerInRound> = chests
            .iter()
            .enumerate()
            .map(|(i, &gems)| {
                let mut player = PlayerInRound::new(PlayerId(i), format!("P{i}"), PlayerKind::Cpu);
                player.add_sack_gems(gems);
                player.add_sack_to_chest();
                player
            })
            .collect();
        let board = Leaderboard::new(&players);
        let ranked = board.players_sorted_by_score();
        prop_assert_eq!(ranked.len(), players.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].chest_gems() >= pair[1].chest_gems());
            if pair[0].chest_gems() == pair[1].chest_gems() {
                prop_assert!(pair[0].id() < pair[1].id());
            }
        }
    }
}
