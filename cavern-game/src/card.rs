//! Cards found in the cave
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GameError;

/// Gem values a treasure card may carry.
pub const TREASURE_GEM_VALUES: [u32; 12] = [1, 2, 3, 4, 5, 7, 9, 11, 13, 14, 15, 17];

/// Gem values a relic may be minted with.
pub const RELIC_GEM_VALUES: [u32; 5] = [5, 7, 8, 10, 12];

/// Hazards lurking in the cave. Two traps are identical when they share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapKind {
    Snake,
    Lava,
    Spider,
    BatteringRam,
    Boulder,
}

impl TrapKind {
    pub const ALL: [Self; 5] = [
        Self::Snake,
        Self::Lava,
        Self::Spider,
        Self::BatteringRam,
        Self::Boulder,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Lava => "lava",
            Self::Spider => "spider",
            Self::BatteringRam => "battering ram",
            Self::Boulder => "boulder",
        }
    }
}

impl fmt::Display for TrapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Broad category of a card, used for deck statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Treasure,
    Trap,
    Relic,
}

/// An immutable card. Relic value is fixed when the relic is minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Card {
    Treasure { gems: u32 },
    Trap { kind: TrapKind },
    Relic { gems: u32 },
}

impl Card {
    /// Create a treasure card.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] when `gems` is not one of
    /// [`TREASURE_GEM_VALUES`].
    pub fn treasure(gems: u32) -> Result<Self, GameError> {
        if TREASURE_GEM_VALUES.contains(&gems) {
            Ok(Self::Treasure { gems })
        } else {
            Err(GameError::InvalidArgument(format!(
                "invalid gem value for treasure card: {gems}"
            )))
        }
    }

    #[must_use]
    pub const fn trap(kind: TrapKind) -> Self {
        Self::Trap { kind }
    }

    /// Mint a relic with a value picked uniformly from [`RELIC_GEM_VALUES`].
    pub fn relic<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let idx = rng.gen_range(0..RELIC_GEM_VALUES.len());
        Self::Relic {
            gems: RELIC_GEM_VALUES[idx],
        }
    }

    /// Mint a relic with a known value.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for a value outside
    /// [`RELIC_GEM_VALUES`].
    pub fn relic_worth(gems: u32) -> Result<Self, GameError> {
        if RELIC_GEM_VALUES.contains(&gems) {
            Ok(Self::Relic { gems })
        } else {
            Err(GameError::InvalidArgument(format!(
                "invalid gem value for relic card: {gems}"
            )))
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CardKind {
        match self {
            Self::Treasure { .. } => CardKind::Treasure,
            Self::Trap { .. } => CardKind::Trap,
            Self::Relic { .. } => CardKind::Relic,
        }
    }

    /// Gems printed on the card, if any.
    #[must_use]
    pub const fn gem_value(&self) -> Option<u32> {
        match self {
            Self::Treasure { gems } | Self::Relic { gems } => Some(*gems),
            Self::Trap { .. } => None,
        }
    }

    #[must_use]
    pub const fn trap_kind(&self) -> Option<TrapKind> {
        match self {
            Self::Trap { kind } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Treasure { gems } => write!(f, "treasure ({gems} gems)"),
            Self::Trap { kind } => write!(f, "{kind} trap"),
            Self::Relic { gems } => write!(f, "relic ({gems} gems)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn treasure_rejects_unknown_values() {
        assert_eq!(Card::treasure(7), Ok(Card::Treasure { gems: 7 }));
        assert!(matches!(
            Card::treasure(6),
            Err(GameError::InvalidArgument(_))
        ));
        assert!(Card::treasure(0).is_err());
    }

    #[test]
    fn relics_mint_from_the_known_values() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        for _ in 0..50 {
            let card = Card::relic(&mut rng);
            let gems = card.gem_value().unwrap();
            assert!(RELIC_GEM_VALUES.contains(&gems));
            assert_eq!(card.kind(), CardKind::Relic);
        }
        assert!(Card::relic_worth(9).is_err());
    }

    #[test]
    fn traps_are_identical_by_kind() {
        assert_eq!(Card::trap(TrapKind::Lava), Card::trap(TrapKind::Lava));
        assert_ne!(Card::trap(TrapKind::Lava), Card::trap(TrapKind::Snake));
        assert_eq!(Card::trap(TrapKind::Boulder).gem_value(), None);
    }

    #[test]
    fn cards_serialize_with_type_tag() {
        let json = serde_json::to_string(&Card::trap(TrapKind::BatteringRam)).unwrap();
        assert_eq!(json, r#"{"type":"trap","kind":"battering_ram"}"#);
        assert_eq!(Card::Relic { gems: 8 }.to_string(), "relic (8 gems)");
    }
}
