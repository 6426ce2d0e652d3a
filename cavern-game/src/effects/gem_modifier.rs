use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::RoundState;

/// Rule adjusting the gems a treasure card is worth before it is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GemModifier {
    /// Treasures keep their printed value.
    #[default]
    Standard,
    /// `base + trap_bonus * drawn traps`
    RiskyReward { trap_bonus: i32 },
    /// `floor(base * factor)`
    GemMultiplier { factor: f64 },
    /// `base + bonus * players who already left`
    LeftReward { bonus: i32 },
}

impl GemModifier {
    #[must_use]
    pub const fn risky_reward(trap_bonus: i32) -> Self {
        Self::RiskyReward { trap_bonus }
    }

    #[must_use]
    pub const fn gem_multiplier(factor: f64) -> Self {
        Self::GemMultiplier { factor }
    }

    #[must_use]
    pub const fn left_reward(bonus: i32) -> Self {
        Self::LeftReward { bonus }
    }

    /// Every selectable gem modifier, in menu order.
    #[must_use]
    pub const fn catalogue() -> [Self; 5] {
        [
            Self::Standard,
            Self::gem_multiplier(2.0),
            Self::gem_multiplier(3.0),
            Self::risky_reward(10),
            Self::left_reward(3),
        ]
    }

    /// Adjusted value of a treasure worth `base` gems. Never negative.
    #[must_use]
    pub fn apply(&self, state: &RoundState, base: u32) -> u32 {
        match *self {
            Self::Standard => base,
            Self::RiskyReward { trap_bonus } => {
                add_per_count(base, trap_bonus, state.drawn_traps().len())
            }
            Self::GemMultiplier { factor } => {
                // `as` saturates at the u32 bounds and maps NaN to zero.
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let adjusted = (f64::from(base) * factor).floor().max(0.0) as u32;
                adjusted
            }
            Self::LeftReward { bonus } => {
                add_per_count(base, bonus, state.players().exited_count())
            }
        }
    }

    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Standard => "standard".to_string(),
            Self::RiskyReward { trap_bonus } => format!("risky-reward:{trap_bonus}"),
            Self::GemMultiplier { factor } => format!("multiplier:{factor}"),
            Self::LeftReward { bonus } => format!("left-reward:{bonus}"),
        }
    }

    /// Parse a key such as `standard`, `multiplier:2`, `risky-reward:10` or
    /// `left-reward:3`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        let (name, arg) = match key.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (key.as_str(), None),
        };
        match (name, arg) {
            ("standard", None) => Some(Self::Standard),
            ("multiplier", Some(arg)) => arg
                .parse::<f64>()
                .ok()
                .filter(|factor| factor.is_finite())
                .map(Self::gem_multiplier),
            ("risky-reward", Some(arg)) => arg.parse().ok().map(Self::risky_reward),
            ("left-reward", Some(arg)) => arg.parse().ok().map(Self::left_reward),
            _ => None,
        }
    }

    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Standard => "no modifiers applied to gems".to_string(),
            Self::RiskyReward { trap_bonus } => {
                format!("{} gems for each trap card already drawn", signed(*trap_bonus))
            }
            Self::GemMultiplier { factor } => format!("multiplier applied to gems [x{factor}]"),
            Self::LeftReward { bonus } => {
                format!("{} gems for each player who exits the round", signed(*bonus))
            }
        }
    }
}

impl fmt::Display for GemModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

fn add_per_count(base: u32, per: i32, count: usize) -> u32 {
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    let adjusted = i64::from(base).saturating_add(i64::from(per).saturating_mul(count));
    u32::try_from(adjusted.max(0)).unwrap_or(u32::MAX)
}

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}
