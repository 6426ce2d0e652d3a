//! Pluggable round rules
//!
//! A [`RoundEffect`] pairs one [`EndCondition`] with one [`GemModifier`].
//! Both are pure functions of a [`RoundState`]; they never mutate it, so a
//! single effect is shared by every round of a game.

mod end_condition;
mod gem_modifier;

pub use end_condition::{EndCondition, RELICS_TO_END_ROUND};
pub use gem_modifier::GemModifier;

use serde::{Deserialize, Serialize};

use crate::state::RoundState;

/// Rule set used by every round of a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundEffect {
    pub end_condition: EndCondition,
    pub gem_modifier: GemModifier,
}

impl RoundEffect {
    #[must_use]
    pub const fn new(end_condition: EndCondition, gem_modifier: GemModifier) -> Self {
        Self {
            end_condition,
            gem_modifier,
        }
    }

    #[must_use]
    pub fn is_end_condition_met(&self, state: &RoundState) -> bool {
        self.end_condition.is_met(state)
    }

    #[must_use]
    pub fn apply_gem_modifier(&self, state: &RoundState, gems: u32) -> u32 {
        self.gem_modifier.apply(state, gems)
    }

    /// End condition description, a newline, then the gem modifier description.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "{}\n{}",
            self.end_condition.description(),
            self.gem_modifier.description()
        )
    }
}
