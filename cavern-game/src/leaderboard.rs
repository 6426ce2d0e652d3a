//! Final ranking of a finished game
use serde::{Deserialize, Serialize};

use crate::players::{PlayerId, PlayerInRound, PlayerKind};

/// One line of the final standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based; tied players share a rank.
    pub rank: usize,
    pub player: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub chest_gems: u32,
}

/// Players ordered by banked gems, highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    players: Vec<PlayerInRound>,
}

impl Leaderboard {
    /// Rank a snapshot of `players`; ties keep their seating order.
    #[must_use]
    pub fn new(players: &[PlayerInRound]) -> Self {
        let mut players = players.to_vec();
        players.sort_by(|a, b| b.chest_gems().cmp(&a.chest_gems()));
        Self { players }
    }

    #[must_use]
    pub fn players_sorted_by_score(&self) -> &[PlayerInRound] {
        &self.players
    }

    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = Vec::with_capacity(self.players.len());
        for (index, player) in self.players.iter().enumerate() {
            let rank = match standings.last() {
                Some(previous) if previous.chest_gems == player.chest_gems() => previous.rank,
                _ => index + 1,
            };
            standings.push(Standing {
                rank,
                player: player.id(),
                name: player.name().to_string(),
                kind: player.kind(),
                chest_gems: player.chest_gems(),
            });
        }
        standings
    }

    /// Everyone sharing the top score.
    pub fn winners(&self) -> impl Iterator<Item = &PlayerInRound> {
        let best = self.players.first().map(PlayerInRound::chest_gems);
        self.players
            .iter()
            .take_while(move |player| Some(player.chest_gems()) == best)
    }

    #[must_use]
    pub fn winning_score(&self) -> Option<u32> {
        self.players.first().map(PlayerInRound::chest_gems)
    }
}
