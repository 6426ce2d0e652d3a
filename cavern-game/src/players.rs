//! Players and per-round seat bookkeeping
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GameError;

/// Seat index of a player within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Cpu,
}

/// Decision a player makes at the end of every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerChoice {
    Stay,
    Exit,
}

/// A player, reused across every round of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInRound {
    id: PlayerId,
    name: String,
    kind: PlayerKind,
    sack_gems: u32,
    chest_gems: u32,
    has_left: bool,
}

impl PlayerInRound {
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            sack_gems: 0,
            chest_gems: 0,
            has_left: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> PlayerKind {
        self.kind
    }

    #[must_use]
    pub const fn is_cpu(&self) -> bool {
        matches!(self.kind, PlayerKind::Cpu)
    }

    /// Gems carried this round and still at risk.
    #[must_use]
    pub const fn sack_gems(&self) -> u32 {
        self.sack_gems
    }

    /// Gems banked for good.
    #[must_use]
    pub const fn chest_gems(&self) -> u32 {
        self.chest_gems
    }

    #[must_use]
    pub const fn has_left(&self) -> bool {
        self.has_left
    }

    pub fn add_sack_gems(&mut self, gems: u32) {
        self.sack_gems = self.sack_gems.saturating_add(gems);
    }

    /// Move the whole sack into the chest, returning the amount banked.
    pub fn add_sack_to_chest(&mut self) -> u32 {
        let banked = std::mem::take(&mut self.sack_gems);
        self.chest_gems = self.chest_gems.saturating_add(banked);
        banked
    }

    /// Empty the sack and step back into the cave for a new round.
    pub fn reset_round(&mut self) {
        self.sack_gems = 0;
        self.has_left = false;
    }

    /// Mark the player as having left the cave this round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotActive`] if the player already left.
    pub fn leave(&mut self) -> Result<(), GameError> {
        if self.has_left {
            return Err(GameError::PlayerNotActive(self.id));
        }
        self.has_left = true;
        Ok(())
    }
}

/// Tracks which seats are still in the cave and who left, in exit order.
///
/// A seat that has exited can never return within the same round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPlayersManager {
    roster: Vec<PlayerId>,
    exited: Vec<PlayerId>,
    cursor: usize,
}

impl RoundPlayersManager {
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] if a seat appears twice.
    pub fn new(roster: Vec<PlayerId>) -> Result<Self, GameError> {
        let mut sorted = roster.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(GameError::InvalidArgument(
                "a player cannot take two seats in one round".to_string(),
            ));
        }
        Ok(Self {
            roster,
            exited: Vec::new(),
            cursor: 0,
        })
    }

    #[must_use]
    pub fn all_players(&self) -> &[PlayerId] {
        &self.roster
    }

    /// Seats still exploring, in seating order.
    pub fn active_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.roster
            .iter()
            .copied()
            .filter(|id| !self.exited.contains(id))
    }

    /// Seats that left this round, in the order they left.
    #[must_use]
    pub fn exited_players(&self) -> &[PlayerId] {
        &self.exited
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.roster.len() - self.exited.len()
    }

    #[must_use]
    pub fn exited_count(&self) -> usize {
        self.exited.len()
    }

    #[must_use]
    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }

    #[must_use]
    pub fn is_active(&self, id: PlayerId) -> bool {
        self.roster.contains(&id) && !self.exited.contains(&id)
    }

    /// Record that a seat left the cave.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotActive`] if the seat is unknown or
    /// already left.
    pub fn mark_exited(&mut self, id: PlayerId) -> Result<(), GameError> {
        if !self.is_active(id) {
            return Err(GameError::PlayerNotActive(id));
        }
        self.exited.push(id);
        Ok(())
    }

    /// Next active seat in round-robin order, starting after the last one
    /// returned.
    pub fn next_active(&mut self) -> Option<PlayerId> {
        let seats = self.roster.len();
        for _ in 0..seats {
            let candidate = self.roster[self.cursor];
            self.cursor = (self.cursor + 1) % seats;
            if !self.exited.contains(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}
