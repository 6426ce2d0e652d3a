//! Plays complete games headlessly and checks the engine's bookkeeping.
use std::collections::HashMap;

use anyhow::{Context, Result};
use cavern_game::{
    CpuDifficulty, EndCondition, GameSession, GameSettings, GemModifier, Leaderboard, PlayerId,
    PlayerKind, RoundReport,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::policy::{PolicySeats, SeatStrategy};

/// Everything needed to set up one simulated game, minus the seed.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub humans: usize,
    pub cpus: usize,
    pub difficulty: CpuDifficulty,
    pub end_condition: EndCondition,
    pub gem_modifier: GemModifier,
    pub rounds: u32,
    pub strategy: SeatStrategy,
}

impl ScenarioConfig {
    /// `strategy/difficulty/end-condition/modifier`, unique per sweep entry.
    #[must_use]
    pub fn name(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.strategy.key(),
            self.difficulty.label(),
            self.end_condition.key(),
            self.gem_modifier.key()
        )
    }

    /// Human seats are named `Seat-1`, `Seat-2`, ...
    ///
    /// # Errors
    ///
    /// Returns every violation the engine finds in the resulting settings.
    pub fn settings(&self) -> Result<GameSettings> {
        GameSettings::builder()
            .humans((1..=self.humans).map(|seat| format!("Seat-{seat}")))
            .cpus(self.cpus)
            .cpu_difficulty(self.difficulty)
            .end_condition(self.end_condition)
            .gem_modifier(self.gem_modifier)
            .rounds(self.rounds)
            .build()
            .with_context(|| format!("invalid game settings for {}", self.name()))
    }
}

/// Bookkeeping rule a finished round or game broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("round {round}: {player} chest shrank from {before} to {after}")]
    ChestShrank {
        round: u32,
        player: String,
        before: u32,
        after: u32,
    },
    #[error("round {round}: {player} kept {sack} gems in the sack after the round")]
    SackNotEmptied { round: u32, player: String, sack: u32 },
    #[error("round {round}: summary counts {summary} turns but {logged} were logged")]
    TurnCountMismatch { round: u32, summary: u32, logged: usize },
    #[error("{player} banked {banked} gems but holds {chest}")]
    BankedMismatch {
        player: String,
        banked: u32,
        chest: u32,
    },
    #[error("leaderboard out of order at rank {rank}")]
    LeaderboardUnsorted { rank: usize },
}

/// Per-round facts kept for aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub number: u32,
    pub turns: u32,
    pub ending: String,
    pub relics_claimed: usize,
    pub lost_gems: u32,
}

/// Outcome of one simulated game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub scenario_name: String,
    pub seed: u64,
    pub rounds: Vec<RoundRecord>,
    pub winners: Vec<String>,
    pub winning_score: u32,
    pub human_won: bool,
    pub cpu_won: bool,
    pub human_exits: usize,
    pub violations: Vec<String>,
}

impl GameRecord {
    #[must_use]
    pub fn total_turns(&self) -> u32 {
        self.rounds.iter().map(|round| round.turns).sum()
    }
}

/// Play one game of `config` from `seed`, checking invariants as it goes.
///
/// # Errors
///
/// Fails when the settings are invalid or the engine rejects an operation.
/// Broken invariants are reported in [`GameRecord::violations`] instead.
pub fn run_game(config: &ScenarioConfig, seed: u64) -> Result<GameRecord> {
    let settings = config.settings()?;
    let mut session = GameSession::new(settings, seed)
        .with_context(|| format!("failed to start {} with seed {seed}", config.name()))?;
    let mut seats = PolicySeats::new(config.strategy.create_policy(seed, config.difficulty));

    let mut violations = Vec::new();
    let mut chests: HashMap<PlayerId, u32> = HashMap::new();
    let mut banked: HashMap<PlayerId, u32> = HashMap::new();
    let mut rounds = Vec::new();

    while session.has_next() {
        let report = session
            .play_round(&mut seats)
            .with_context(|| format!("engine error in {} seed {seed}", config.name()))?;
        credit_banked(&report, &mut banked);
        violations.extend(check_round(&session, &report, &mut chests));
        rounds.push(RoundRecord {
            number: report.summary.number,
            turns: report.summary.turns,
            ending: report.summary.ending.label().to_string(),
            relics_claimed: report.summary.relics_claimed,
            lost_gems: report.turns.iter().map(|turn| turn.lost_gems).sum(),
        });
    }

    let board = session.leaderboard()?;
    violations.extend(check_banked(&board, &banked));
    violations.extend(check_leaderboard(&board));

    let winners: Vec<_> = board.winners().collect();
    log::debug!(
        "{} seed {seed}: {} rounds, {} seats exited {} times, winners {:?}",
        config.name(),
        rounds.len(),
        seats.name(),
        seats.exits,
        winners.iter().map(|p| p.name()).collect::<Vec<_>>()
    );

    Ok(GameRecord {
        scenario_name: config.name(),
        seed,
        rounds,
        winners: winners.iter().map(|p| p.name().to_string()).collect(),
        winning_score: board.winning_score().unwrap_or(0),
        human_won: winners.iter().any(|p| p.kind() == PlayerKind::Human),
        cpu_won: winners.iter().any(|p| p.kind() == PlayerKind::Cpu),
        human_exits: seats.exits,
        violations: violations.iter().map(ToString::to_string).collect(),
    })
}

fn credit_banked(report: &RoundReport, banked: &mut HashMap<PlayerId, u32>) {
    let exits = report
        .turns
        .iter()
        .flat_map(|turn| turn.settlement.exits.iter());
    for record in exits.chain(report.summary.banked.iter()) {
        *banked.entry(record.player).or_default() += record.banked;
    }
}

fn check_round(
    session: &GameSession,
    report: &RoundReport,
    chests: &mut HashMap<PlayerId, u32>,
) -> Vec<InvariantViolation> {
    let round = report.summary.number;
    let mut violations = Vec::new();

    if report.summary.turns as usize != report.turns.len() {
        violations.push(InvariantViolation::TurnCountMismatch {
            round,
            summary: report.summary.turns,
            logged: report.turns.len(),
        });
    }

    for player in session.game().players() {
        let before = chests.insert(player.id(), player.chest_gems()).unwrap_or(0);
        if player.chest_gems() < before {
            violations.push(InvariantViolation::ChestShrank {
                round,
                player: player.name().to_string(),
                before,
                after: player.chest_gems(),
            });
        }
        if player.sack_gems() != 0 {
            violations.push(InvariantViolation::SackNotEmptied {
                round,
                player: player.name().to_string(),
                sack: player.sack_gems(),
            });
        }
    }

    violations
}

fn check_banked(board: &Leaderboard, banked: &HashMap<PlayerId, u32>) -> Vec<InvariantViolation> {
    board
        .players_sorted_by_score()
        .iter()
        .filter_map(|player| {
            let total = banked.get(&player.id()).copied().unwrap_or(0);
            (total != player.chest_gems()).then(|| InvariantViolation::BankedMismatch {
                player: player.name().to_string(),
                banked: total,
                chest: player.chest_gems(),
            })
        })
        .collect()
}

fn check_leaderboard(board: &Leaderboard) -> Vec<InvariantViolation> {
    board
        .standings()
        .windows(2)
        .filter(|pair| pair[0].chest_gems < pair[1].chest_gems || pair[0].rank > pair[1].rank)
        .map(|pair| InvariantViolation::LeaderboardUnsorted { rank: pair[1].rank })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(strategy: SeatStrategy) -> ScenarioConfig {
        ScenarioConfig {
            humans: 1,
            cpus: 3,
            difficulty: CpuDifficulty::Normal,
            end_condition: EndCondition::Standard,
            gem_modifier: GemModifier::Standard,
            rounds: 4,
            strategy,
        }
    }

    #[test]
    fn scenario_names_list_every_axis() {
        let mut config = config(SeatStrategy::Mirror);
        config.gem_modifier = GemModifier::left_reward(3);
        assert_eq!(config.name(), "mirror/normal/standard/left-reward:3");
    }

    #[test]
    fn games_play_cleanly_for_every_strategy() {
        for strategy in SeatStrategy::ALL {
            let record = run_game(&config(strategy), 1337).unwrap();
            assert_eq!(record.rounds.len(), 4);
            assert!(record.violations.is_empty(), "{:?}", record.violations);
            assert!(!record.winners.is_empty());
            assert!(record.human_won || record.cpu_won);
            assert!(record.total_turns() >= 4);
        }
    }

    #[test]
    fn greedy_seats_never_exit() {
        let record = run_game(&config(SeatStrategy::Greedy), 9).unwrap();
        assert_eq!(record.human_exits, 0);
    }

    #[test]
    fn same_seed_same_record() {
        let first = run_game(&config(SeatStrategy::CoinFlip), 77).unwrap();
        let second = run_game(&config(SeatStrategy::CoinFlip), 77).unwrap();
        assert_eq!(first.winners, second.winners);
        assert_eq!(first.winning_score, second.winning_score);
        assert_eq!(first.total_turns(), second.total_turns());
    }

    #[test]
    fn invalid_settings_are_errors() {
        let mut config = config(SeatStrategy::Cautious);
        config.cpus = 1;
        config.humans = 0;
        let err = run_game(&config, 1).unwrap_err();
        assert!(format!("{err:#}").contains("invalid game settings"));
    }

    #[test]
    fn violations_render_readably() {
        let violation = InvariantViolation::ChestShrank {
            round: 2,
            player: "Seat-1".to_string(),
            before: 10,
            after: 4,
        };
        assert_eq!(
            violation.to_string(),
            "round 2: Seat-1 chest shrank from 10 to 4"
        );
    }
}
