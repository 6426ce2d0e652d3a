use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::RoundState;

/// Relics that must be claimed before [`EndCondition::ThreeRelicsDrawn`] fires.
pub const RELICS_TO_END_ROUND: usize = 3;

/// Rule deciding when a round is over.
///
/// Every variant also ends the round once nobody is left in the cave or
/// the deck runs dry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    /// Two traps of the same kind have been drawn.
    #[default]
    Standard,
    /// Any trap has been drawn.
    FirstTrapEnds,
    /// Three relics have been claimed.
    ThreeRelicsDrawn,
}

impl EndCondition {
    /// Every selectable end condition, in menu order.
    pub const CATALOGUE: [Self; 3] = [Self::Standard, Self::FirstTrapEnds, Self::ThreeRelicsDrawn];

    #[must_use]
    pub fn is_met(&self, state: &RoundState) -> bool {
        !state.players().has_active() || !state.deck().has_next() || self.rule_triggered(state)
    }

    /// Whether the rule itself fired, ignoring the empty-cave and empty-deck
    /// fallbacks.
    #[must_use]
    pub fn rule_triggered(&self, state: &RoundState) -> bool {
        match self {
            Self::Standard => state.has_repeated_trap(),
            Self::FirstTrapEnds => !state.drawn_traps().is_empty(),
            Self::ThreeRelicsDrawn => state.claimed_relics() >= RELICS_TO_END_ROUND,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::FirstTrapEnds => "first-trap-ends",
            Self::ThreeRelicsDrawn => "three-relics-drawn",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Standard => "two identical trap cards are drawn",
            Self::FirstTrapEnds => "a trap card is drawn",
            Self::ThreeRelicsDrawn => "three relics are claimed",
        }
    }

    /// Look up a catalogue entry by its [`key`](Self::key).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::CATALOGUE
            .into_iter()
            .find(|condition| condition.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
