//! One descent into the cave: a sequence of turns over a shared state.
use log::info;
use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::effects::{EndCondition, RoundEffect};
use crate::error::GameError;
use crate::players::{PlayerInRound, RoundPlayersManager};
use crate::state::RoundState;
use crate::turn::{ExitRecord, Turn};

/// Why a round stopped producing turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reason", content = "condition", rename_all = "snake_case")]
pub enum RoundEnding {
    /// The round's end condition fired.
    EndCondition(EndCondition),
    DeckExhausted,
    AllPlayersLeft,
}

impl RoundEnding {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::EndCondition(condition) => condition.key(),
            Self::DeckExhausted => "deck-exhausted",
            Self::AllPlayersLeft => "all-players-left",
        }
    }
}

/// Result of [`Round::end_round`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub number: u32,
    pub turns: u32,
    pub ending: RoundEnding,
    /// Sacks flushed at round end, for players still in the cave.
    pub banked: Vec<ExitRecord>,
    pub cards_drawn: usize,
    pub relics_claimed: usize,
}

/// A round borrowing the game's players for its whole lifetime.
#[derive(Debug)]
pub struct Round<'g> {
    number: u32,
    players: &'g mut [PlayerInRound],
    state: RoundState,
    effect: RoundEffect,
    turn_number: u32,
    ended: bool,
}

impl<'g> Round<'g> {
    /// Start a round, emptying every sack and bringing everyone back in.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] when `players` is empty or two
    /// players share a seat.
    pub fn new(
        number: u32,
        players: &'g mut [PlayerInRound],
        deck: Deck,
        effect: RoundEffect,
    ) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::InvalidArgument(
                "a round needs at least one player".to_string(),
            ));
        }
        let roster = RoundPlayersManager::new(players.iter().map(PlayerInRound::id).collect())?;
        players.iter_mut().for_each(PlayerInRound::reset_round);
        Ok(Self {
            number,
            players,
            state: RoundState::new(deck, roster),
            effect,
            turn_number: 0,
            ended: false,
        })
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Turns started so far.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub const fn state(&self) -> &RoundState {
        &self.state
    }

    #[must_use]
    pub const fn effect(&self) -> &RoundEffect {
        &self.effect
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerInRound] {
        &*self.players
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.effect.description()
    }

    /// Whether another turn can be played.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.ended && !self.effect.is_end_condition_met(&self.state)
    }

    /// Start the next turn.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSuchTurn`] once the round is over.
    pub fn next_turn(&mut self) -> Result<Turn<'_>, GameError> {
        if !self.has_next() {
            return Err(GameError::NoSuchTurn);
        }
        self.turn_number += 1;
        let current = self.state.players_mut().next_active();
        Ok(Turn::new(
            self.turn_number,
            current,
            &mut *self.players,
            &mut self.state,
            &self.effect,
        ))
    }

    /// Close the round: whoever is still in the cave banks their sack.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalState`] while turns remain or if the round
    /// was already closed.
    pub fn end_round(&mut self) -> Result<RoundSummary, GameError> {
        if self.ended {
            return Err(GameError::IllegalState("the round has already ended"));
        }
        if self.has_next() {
            return Err(GameError::IllegalState(
                "the round cannot end while turns remain",
            ));
        }
        let ending = self.ending();
        let banked = self
            .players
            .iter_mut()
            .filter_map(|player| {
                let gems = player.add_sack_to_chest();
                (gems > 0).then(|| ExitRecord {
                    player: player.id(),
                    banked: gems,
                })
            })
            .collect();
        self.ended = true;
        info!(
            "round {} over after {} turns ({})",
            self.number,
            self.turn_number,
            ending.label()
        );
        Ok(RoundSummary {
            number: self.number,
            turns: self.turn_number,
            ending,
            banked,
            cards_drawn: self.state.cards_drawn(),
            relics_claimed: self.state.claimed_relics(),
        })
    }

    fn ending(&self) -> RoundEnding {
        if !self.state.players().has_active() {
            RoundEnding::AllPlayersLeft
        } else if self.effect.end_condition.rule_triggered(&self.state) {
            RoundEnding::EndCondition(self.effect.end_condition)
        } else {
            RoundEnding::DeckExhausted
        }
    }
}
