//! Mutable record of what has happened in the current round
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::card::{Card, TrapKind};
use crate::deck::Deck;
use crate::players::{PlayerId, RoundPlayersManager};

/// A relic lying on the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRelic {
    pub gems: u32,
    pub claimed_by: Option<PlayerId>,
}

impl PathRelic {
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }
}

/// Round state owned by a [`crate::Round`]. Strategies only ever read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    deck: Deck,
    path: Vec<Card>,
    drawn_traps: SmallVec<[TrapKind; 8]>,
    relics: SmallVec<[PathRelic; 5]>,
    path_gems: u32,
    players: RoundPlayersManager,
}

impl RoundState {
    #[must_use]
    pub fn new(deck: Deck, players: RoundPlayersManager) -> Self {
        Self {
            deck,
            path: Vec::new(),
            drawn_traps: SmallVec::new(),
            relics: SmallVec::new(),
            path_gems: 0,
            players,
        }
    }

    #[must_use]
    pub const fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Every card drawn this round, in draw order.
    #[must_use]
    pub fn path(&self) -> &[Card] {
        &self.path
    }

    #[must_use]
    pub fn cards_drawn(&self) -> usize {
        self.path.len()
    }

    /// Trap kinds in draw order, duplicates included.
    #[must_use]
    pub fn drawn_traps(&self) -> &[TrapKind] {
        &self.drawn_traps
    }

    /// Number of different trap kinds revealed so far.
    #[must_use]
    pub fn distinct_trap_kinds(&self) -> usize {
        self.drawn_traps.iter().collect::<BTreeSet<_>>().len()
    }

    /// Whether any trap kind has shown up twice.
    #[must_use]
    pub fn has_repeated_trap(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.drawn_traps.iter().any(|kind| !seen.insert(*kind))
    }

    /// Every relic drawn this round, claimed or not.
    #[must_use]
    pub fn drawn_relics(&self) -> &[PathRelic] {
        &self.relics
    }

    pub fn unclaimed_relics(&self) -> impl Iterator<Item = &PathRelic> {
        self.relics.iter().filter(|relic| !relic.is_claimed())
    }

    #[must_use]
    pub fn claimed_relics(&self) -> usize {
        self.relics.iter().filter(|relic| relic.is_claimed()).count()
    }

    /// Gems lying on the path that nobody owns yet.
    #[must_use]
    pub const fn path_gems(&self) -> u32 {
        self.path_gems
    }

    #[must_use]
    pub const fn players(&self) -> &RoundPlayersManager {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut RoundPlayersManager {
        &mut self.players
    }

    pub(crate) fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }

    /// Put a freshly drawn card on the path and record its side effects.
    pub(crate) fn place_on_path(&mut self, card: Card) {
        match card {
            Card::Trap { kind } => self.drawn_traps.push(kind),
            Card::Relic { gems } => {
                self.relics.push(PathRelic {
                    gems,
                    claimed_by: None,
                });
                self.path_gems = self.path_gems.saturating_add(gems);
            }
            Card::Treasure { .. } => {}
        }
        self.path.push(card);
    }

    /// Hand every unclaimed relic to `player`, returning the gems claimed.
    pub(crate) fn claim_relics(&mut self, player: PlayerId) -> u32 {
        let mut claimed = 0_u32;
        for relic in self.relics.iter_mut().filter(|relic| !relic.is_claimed()) {
            relic.claimed_by = Some(player);
            claimed = claimed.saturating_add(relic.gems);
        }
        self.path_gems = self.path_gems.saturating_sub(claimed);
        claimed
    }
}
