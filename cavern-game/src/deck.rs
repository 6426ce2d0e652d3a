//! Deck construction, shuffling and drawing
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::card::{Card, CardKind, TrapKind};
use crate::error::GameError;

/// Treasure composition of the standard deck as `(gems, copies)`.
const STANDARD_TREASURES: [(u32, usize); 12] = [
    (1, 1),
    (2, 1),
    (3, 1),
    (4, 1),
    (5, 2),
    (7, 2),
    (9, 1),
    (11, 2),
    (13, 1),
    (14, 1),
    (15, 1),
    (17, 1),
];
const STANDARD_TRAPS_PER_KIND: usize = 3;
const STANDARD_RELICS: usize = 5;

/// Counts describing the composition a deck was built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckComposition {
    pub size: usize,
    pub treasures: usize,
    pub traps: usize,
    pub relics: usize,
    pub trap_kinds: usize,
}

impl DeckComposition {
    fn of<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut composition = Self::default();
        let mut kinds = BTreeSet::new();
        for card in cards {
            composition.size += 1;
            match card {
                Card::Treasure { .. } => composition.treasures += 1,
                Card::Trap { kind } => {
                    composition.traps += 1;
                    kinds.insert(*kind);
                }
                Card::Relic { .. } => composition.relics += 1,
            }
        }
        composition.trap_kinds = kinds.len();
        composition
    }
}

/// Ordered sequence of cards consumed from the front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: VecDeque<Card>,
    composition: DeckComposition,
}

impl Deck {
    #[must_use]
    pub fn new(cards: Vec<Card>) -> Self {
        let composition = DeckComposition::of(&cards);
        Self {
            cards: cards.into(),
            composition,
        }
    }

    /// The standard 35-card deck: 15 treasures, 3 traps of each kind and
    /// 5 relics, shuffled.
    pub fn standard<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut builder = DeckBuilder::new();
        for (gems, copies) in STANDARD_TREASURES {
            builder.push_treasures(gems, copies);
        }
        for kind in TrapKind::ALL {
            builder.push_traps(kind, STANDARD_TRAPS_PER_KIND);
        }
        builder.push_relics(STANDARD_RELICS, rng);
        let mut deck = builder.build();
        deck.shuffle(rng);
        deck
    }

    /// Remove and return the front card.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyDeck`] when no cards remain.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        self.cards.pop_front().ok_or(GameError::EmptyDeck)
    }

    /// Look at the front card without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyDeck`] when no cards remain.
    pub fn peek(&self) -> Result<&Card, GameError> {
        self.cards.front().ok_or(GameError::EmptyDeck)
    }

    /// Randomize the order of the remaining cards.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// A shuffled copy of this deck, leaving `self` untouched.
    #[must_use]
    pub fn shuffled_copy<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut copy = self.clone();
        copy.shuffle(rng);
        copy
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.cards.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn remaining_of(&self, kind: CardKind) -> usize {
        self.cards.iter().filter(|card| card.kind() == kind).count()
    }

    #[must_use]
    pub fn remaining_treasures(&self) -> usize {
        self.remaining_of(CardKind::Treasure)
    }

    #[must_use]
    pub fn remaining_traps(&self) -> usize {
        self.remaining_of(CardKind::Trap)
    }

    #[must_use]
    pub fn remaining_relics(&self) -> usize {
        self.remaining_of(CardKind::Relic)
    }

    /// Composition the deck was built with, independent of draws.
    #[must_use]
    pub const fn composition(&self) -> DeckComposition {
        self.composition
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

/// Incrementally assembles a [`Deck`].
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    cards: Vec<Card>,
}

impl DeckBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown treasure value.
    pub fn add_treasure(&mut self, gems: u32) -> Result<&mut Self, GameError> {
        self.cards.push(Card::treasure(gems)?);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown treasure value
    /// or a zero count.
    pub fn add_treasures(&mut self, gems: u32, count: usize) -> Result<&mut Self, GameError> {
        require_count("treasure", count)?;
        let card = Card::treasure(gems)?;
        self.cards.extend(std::iter::repeat_n(card, count));
        Ok(self)
    }

    pub fn add_trap(&mut self, kind: TrapKind) -> &mut Self {
        self.cards.push(Card::trap(kind));
        self
    }

    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for a zero count.
    pub fn add_traps(&mut self, kind: TrapKind, count: usize) -> Result<&mut Self, GameError> {
        require_count("trap", count)?;
        self.push_traps(kind, count);
        Ok(self)
    }

    pub fn add_relic<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        self.cards.push(Card::relic(rng));
        self
    }

    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for a zero count.
    pub fn add_relics<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<&mut Self, GameError> {
        require_count("relic", count)?;
        self.push_relics(count, rng);
        Ok(self)
    }

    /// Append an already-minted card.
    pub fn add_card(&mut self, card: Card) -> &mut Self {
        self.cards.push(card);
        self
    }

    #[must_use]
    pub fn build(self) -> Deck {
        Deck::new(self.cards)
    }

    // Standard-deck helpers; the inputs are known-good constants.
    fn push_treasures(&mut self, gems: u32, count: usize) {
        self.cards
            .extend(std::iter::repeat_n(Card::Treasure { gems }, count));
    }

    fn push_traps(&mut self, kind: TrapKind, count: usize) {
        self.cards.extend(std::iter::repeat_n(Card::trap(kind), count));
    }

    fn push_relics<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        for _ in 0..count {
            self.cards.push(Card::relic(rng));
        }
    }
}

fn require_count(what: &str, count: usize) -> Result<(), GameError> {
    if count == 0 {
        return Err(GameError::InvalidArgument(format!(
            "{what} count must be greater than zero"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn standard_deck_has_expected_composition() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let deck = Deck::standard(&mut rng);
        let composition = deck.composition();
        assert_eq!(composition.size, 35);
        assert_eq!(composition.treasures, 15);
        assert_eq!(composition.traps, 15);
        assert_eq!(composition.relics, 5);
        assert_eq!(composition.trap_kinds, 5);
        assert_eq!(deck.remaining(), 35);
        assert_eq!(deck.remaining_traps(), 15);
    }

    #[test]
    fn draw_takes_from_the_front_and_peek_does_not_consume() {
        let mut builder = DeckBuilder::new();
        builder.add_treasure(3).unwrap();
        builder.add_trap(TrapKind::Spider);
        let mut deck = builder.build();

        assert_eq!(deck.peek(), Ok(&Card::Treasure { gems: 3 }));
        assert_eq!(deck.remaining(), 2);
        assert_eq!(deck.draw(), Ok(Card::Treasure { gems: 3 }));
        assert_eq!(deck.draw(), Ok(Card::trap(TrapKind::Spider)));
        assert!(!deck.has_next());
        assert_eq!(deck.draw(), Err(GameError::EmptyDeck));
        assert_eq!(deck.peek(), Err(GameError::EmptyDeck));
    }

    #[test]
    fn composition_survives_draws() {
        let mut builder = DeckBuilder::new();
        builder.add_traps(TrapKind::Lava, 2).unwrap();
        builder.add_trap(TrapKind::Snake);
        let mut deck = builder.build();
        deck.draw().unwrap();
        assert_eq!(deck.remaining(), 2);
        assert_eq!(deck.composition().traps, 3);
        assert_eq!(deck.composition().trap_kinds, 2);
    }

    #[test]
    fn builder_rejects_zero_counts_and_bad_values() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut builder = DeckBuilder::new();
        assert!(builder.add_treasures(5, 0).is_err());
        assert!(builder.add_treasures(6, 2).is_err());
        assert!(builder.add_traps(TrapKind::Boulder, 0).is_err());
        assert!(builder.add_relics(0, &mut rng).is_err());
        assert_eq!(builder.build().remaining(), 0);
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed_and_keeps_cards() {
        let base = Deck::standard(&mut ChaCha20Rng::seed_from_u64(7));
        let a = base.shuffled_copy(&mut ChaCha20Rng::seed_from_u64(11));
        let b = base.shuffled_copy(&mut ChaCha20Rng::seed_from_u64(11));
        assert_eq!(a, b);
        assert_eq!(a.composition(), base.composition());
        assert_eq!(a.remaining_relics(), 5);
    }
}
