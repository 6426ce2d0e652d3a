//! CPU stay/exit heuristic
//!
//! A CPU scores its situation as a weighted sum of normalized features and
//! compares the score against a random "borderline" drawn from its
//! difficulty profile. A score at or above the borderline means leaving.
use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GameError;
use crate::players::{PlayerChoice, PlayerInRound};
use crate::state::RoundState;

/// Sack size at which the gem feature reaches 1.0.
pub const SACK_GEMS_REFERENCE: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl CpuDifficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Balance profile for this tier.
    #[must_use]
    pub const fn variables(self) -> CpuDifficultyVariables {
        match self {
            Self::Easy => CpuDifficultyVariables {
                weight_gems: 0.60,
                weight_traps: 0.05,
                weight_cards: 0.15,
                weight_relics: 0.0,
                weight_players: 0.20,
                min_borderline: 0.4,
                max_borderline: 0.7,
            },
            Self::Normal => CpuDifficultyVariables {
                weight_gems: 0.25,
                weight_traps: 0.20,
                weight_cards: 0.15,
                weight_relics: 0.20,
                weight_players: 0.20,
                min_borderline: 0.5,
                max_borderline: 0.7,
            },
            Self::Hard => CpuDifficultyVariables {
                weight_gems: 0.05,
                weight_traps: 0.50,
                weight_cards: 0.15,
                weight_relics: 0.30,
                weight_players: 0.0,
                min_borderline: 0.5,
                max_borderline: 0.7,
            },
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for CpuDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weights and borderline range of one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuDifficultyVariables {
    pub weight_gems: f64,
    pub weight_traps: f64,
    pub weight_cards: f64,
    pub weight_relics: f64,
    pub weight_players: f64,
    pub min_borderline: f64,
    pub max_borderline: f64,
}

/// Normalized inputs of the risk score, each roughly in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatures {
    pub gems: f64,
    pub traps: f64,
    pub cards: f64,
    pub relics: f64,
    pub players: f64,
}

impl RiskFeatures {
    /// Extract features for `player` from the round state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] when nobody is left in the cave.
    pub fn extract(state: &RoundState, player: &PlayerInRound) -> Result<Self, GameError> {
        let players = state.players();
        if !players.has_active() {
            return Err(GameError::InvalidArgument(
                "there must be at least one active player to score".to_string(),
            ));
        }
        let composition = state.deck().composition();
        Ok(Self {
            gems: f64::from(player.sack_gems()) / SACK_GEMS_REFERENCE,
            traps: ratio(state.distinct_trap_kinds(), composition.trap_kinds),
            cards: ratio(state.cards_drawn(), composition.size),
            relics: ratio(state.claimed_relics() * 2, composition.relics),
            players: ratio(players.active_count(), players.all_players().len()),
        })
    }

    /// Linear combination of the features with the profile weights.
    #[must_use]
    pub fn score(&self, profile: &CpuDifficultyVariables) -> f64 {
        profile.weight_gems * self.gems
            + profile.weight_traps * self.traps
            + profile.weight_cards * self.cards
            + profile.weight_relics * self.relics
            + profile.weight_players * self.players
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Stay/exit heuristic with an injectable random source.
#[derive(Debug, Clone)]
pub struct LogicCpu<R = ChaCha20Rng> {
    rng: R,
}

impl LogicCpu<ChaCha20Rng> {
    /// Deterministic heuristic seeded from `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> LogicCpu<R> {
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Decide whether `player` stays in the cave.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] when the state has no active
    /// players to reason about.
    pub fn cpu_choice(
        &mut self,
        state: &RoundState,
        player: &PlayerInRound,
        profile: &CpuDifficultyVariables,
    ) -> Result<PlayerChoice, GameError> {
        let features = RiskFeatures::extract(state, player)?;
        let score = features.score(profile);
        let borderline = self.borderline(profile);
        let choice = if score >= borderline {
            PlayerChoice::Exit
        } else {
            PlayerChoice::Stay
        };
        trace!(
            "{}: score {score:.3} vs borderline {borderline:.3} -> {choice:?}",
            player.name()
        );
        Ok(choice)
    }

    /// Uniform draw in `[min_borderline, max_borderline]`.
    pub fn borderline(&mut self, profile: &CpuDifficultyVariables) -> f64 {
        let (low, high) = (profile.min_borderline, profile.max_borderline);
        if low < high {
            self.rng.gen_range(low..=high)
        } else {
            low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, TrapKind};
    use crate::deck::Deck;
    use crate::players::{PlayerId, PlayerKind, RoundPlayersManager};

    fn state(players: usize) -> RoundState {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let roster = (0..players).map(PlayerId).collect();
        RoundState::new(
            Deck::standard(&mut rng),
            RoundPlayersManager::new(roster).unwrap(),
        )
    }

    fn cpu_with_sack(gems: u32) -> PlayerInRound {
        let mut player = PlayerInRound::new(PlayerId(0), "CPU-1", PlayerKind::Cpu);
        player.add_sack_gems(gems);
        player
    }

    fn fixed(weights: [f64; 5], borderline: f64) -> CpuDifficultyVariables {
        CpuDifficultyVariables {
            weight_gems: weights[0],
            weight_traps: weights[1],
            weight_cards: weights[2],
            weight_relics: weights[3],
            weight_players: weights[4],
            min_borderline: borderline,
            max_borderline: borderline,
        }
    }

    #[test]
    fn features_normalize_against_deck_and_table() {
        let mut state = state(4);
        state.place_on_path(Card::trap(TrapKind::Lava));
        state.place_on_path(Card::trap(TrapKind::Lava));
        state.place_on_path(Card::Relic { gems: 5 });
        state.claim_relics(PlayerId(1));
        state.players_mut().mark_exited(PlayerId(1)).unwrap();

        let features = RiskFeatures::extract(&state, &cpu_with_sack(10)).unwrap();
        assert!((features.gems - 0.5).abs() < 1e-9);
        assert!((features.traps - 0.2).abs() < 1e-9);
        assert!((features.cards - 3.0 / 35.0).abs() < 1e-9);
        assert!((features.relics - 0.4).abs() < 1e-9);
        assert!((features.players - 0.75).abs() < 1e-9);
    }

    #[test]
    fn score_at_borderline_exits() {
        let state = state(2);
        let mut cpu = LogicCpu::seeded(1);
        // players feature is 1.0, so the score equals the players weight
        let profile = fixed([0.0, 0.0, 0.0, 0.0, 0.5], 0.5);
        assert_eq!(
            cpu.cpu_choice(&state, &cpu_with_sack(0), &profile),
            Ok(PlayerChoice::Exit)
        );
        let profile = fixed([0.0, 0.0, 0.0, 0.0, 0.49], 0.5);
        assert_eq!(
            cpu.cpu_choice(&state, &cpu_with_sack(0), &profile),
            Ok(PlayerChoice::Stay)
        );
    }

    #[test]
    fn full_sack_pushes_easy_cpus_out() {
        let state = state(3);
        let mut cpu = LogicCpu::seeded(8);
        let easy = CpuDifficulty::Easy.variables();
        for _ in 0..20 {
            assert_eq!(
                cpu.cpu_choice(&state, &cpu_with_sack(40), &easy),
                Ok(PlayerChoice::Exit)
            );
        }
    }

    #[test]
    fn borderline_stays_within_the_profile_range() {
        let mut cpu = LogicCpu::seeded(42);
        for difficulty in CpuDifficulty::ALL {
            let profile = difficulty.variables();
            for _ in 0..200 {
                let value = cpu.borderline(&profile);
                assert!(value >= profile.min_borderline && value <= profile.max_borderline);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_decisions() {
        let state = state(3);
        let player = cpu_with_sack(6);
        let profile = CpuDifficulty::Normal.variables();
        let mut a = LogicCpu::seeded(77);
        let mut b = LogicCpu::seeded(77);
        for _ in 0..50 {
            assert_eq!(
                a.cpu_choice(&state, &player, &profile),
                b.cpu_choice(&state, &player, &profile)
            );
        }
    }

    #[test]
    fn empty_cave_cannot_be_scored() {
        let mut state = state(1);
        state.players_mut().mark_exited(PlayerId(0)).unwrap();
        let mut cpu = LogicCpu::seeded(0);
        assert!(matches!(
            cpu.cpu_choice(&state, &cpu_with_sack(1), &CpuDifficulty::Hard.variables()),
            Err(GameError::InvalidArgument(_))
        ));
    }
}
