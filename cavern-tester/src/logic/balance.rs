//! Balance statistics aggregated over many simulated games.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::simulation::GameRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceAggregate {
    pub scenario_name: String,
    pub games: u32,
    pub mean_winning_score: f64,
    pub std_winning_score: f64,
    pub mean_turns_per_round: f64,
    pub mean_relics_per_round: f64,
    pub mean_lost_gems_per_round: f64,
    /// Share of rounds per ending label, in `[0, 1]`.
    pub ending_mix: BTreeMap<String, f64>,
    /// Games a human seat won or shared.
    pub human_win_rate: f64,
    /// Games a CPU seat won or shared.
    pub cpu_win_rate: f64,
}

pub fn aggregate_balance(records: &[GameRecord]) -> Vec<BalanceAggregate> {
    let mut aggregates: BTreeMap<String, AggregateBuilder> = BTreeMap::new();

    for record in records {
        aggregates
            .entry(record.scenario_name.clone())
            .or_insert_with(|| AggregateBuilder::new(&record.scenario_name))
            .ingest(record);
    }

    aggregates
        .into_values()
        .map(AggregateBuilder::finish)
        .collect()
}

struct AggregateBuilder {
    scenario_name: String,
    games: u32,
    rounds: u32,
    winning_score: RunningStats,
    turns_sum: u64,
    relics_sum: u64,
    lost_gems_sum: u64,
    endings: BTreeMap<String, u32>,
    human_wins: u32,
    cpu_wins: u32,
}

impl AggregateBuilder {
    fn new(scenario_name: &str) -> Self {
        Self {
            scenario_name: scenario_name.to_string(),
            games: 0,
            rounds: 0,
            winning_score: RunningStats::default(),
            turns_sum: 0,
            relics_sum: 0,
            lost_gems_sum: 0,
            endings: BTreeMap::new(),
            human_wins: 0,
            cpu_wins: 0,
        }
    }

    fn ingest(&mut self, record: &GameRecord) {
        self.games += 1;
        self.winning_score.add(f64::from(record.winning_score));
        self.human_wins += u32::from(record.human_won);
        self.cpu_wins += u32::from(record.cpu_won);
        for round in &record.rounds {
            self.rounds += 1;
            self.turns_sum += u64::from(round.turns);
            self.relics_sum += u64::try_from(round.relics_claimed).unwrap_or(u64::MAX);
            self.lost_gems_sum += u64::from(round.lost_gems);
            *self.endings.entry(round.ending.clone()).or_default() += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> BalanceAggregate {
        let games = f64::from(self.games.max(1));
        let rounds = f64::from(self.rounds.max(1));
        BalanceAggregate {
            scenario_name: self.scenario_name,
            games: self.games,
            mean_winning_score: self.winning_score.mean(),
            std_winning_score: self.winning_score.std_dev(),
            mean_turns_per_round: self.turns_sum as f64 / rounds,
            mean_relics_per_round: self.relics_sum as f64 / rounds,
            mean_lost_gems_per_round: self.lost_gems_sum as f64 / rounds,
            ending_mix: self
                .endings
                .into_iter()
                .map(|(label, count)| (label, f64::from(count) / rounds))
                .collect(),
            human_win_rate: f64::from(self.human_wins) / games,
            cpu_win_rate: f64::from(self.cpu_wins) / games,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct RunningStats {
    count: u32,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let count = f64::from(self.count);
        let delta = value - self.mean;
        self.mean += delta / count;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    const fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    fn std_dev(&self) -> f64 {
        if self.count > 1 {
            (self.m2 / f64::from(self.count - 1)).sqrt()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::simulation::RoundRecord;

    fn record(name: &str, score: u32, human_won: bool, endings: &[(&str, u32)]) -> GameRecord {
        GameRecord {
            scenario_name: name.to_string(),
            seed: 0,
            rounds: endings
                .iter()
                .enumerate()
                .map(|(i, (ending, turns))| RoundRecord {
                    number: u32::try_from(i).unwrap() + 1,
                    turns: *turns,
                    ending: (*ending).to_string(),
                    relics_claimed: 1,
                    lost_gems: 2,
                })
                .collect(),
            winners: vec!["Seat-1".to_string()],
            winning_score: score,
            human_won,
            cpu_won: !human_won,
            human_exits: 0,
            violations: Vec::new(),
        }
    }

    #[test]
    fn aggregates_group_by_scenario() {
        let records = vec![
            record("b", 10, true, &[("standard", 4)]),
            record("a", 20, false, &[("standard", 6), ("all-players-left", 2)]),
            record("a", 30, true, &[("deck-exhausted", 10), ("standard", 2)]),
        ];
        let aggregates = aggregate_balance(&records);
        assert_eq!(aggregates.len(), 2);

        let a = &aggregates[0];
        assert_eq!(a.scenario_name, "a");
        assert_eq!(a.games, 2);
        assert!((a.mean_winning_score - 25.0).abs() < f64::EPSILON);
        assert!((a.std_winning_score - 50f64.sqrt()).abs() < 1e-9);
        assert!((a.mean_turns_per_round - 5.0).abs() < f64::EPSILON);
        assert!((a.ending_mix["standard"] - 0.5).abs() < f64::EPSILON);
        assert!((a.human_win_rate - 0.5).abs() < f64::EPSILON);
        assert!((a.cpu_win_rate - 0.5).abs() < f64::EPSILON);
        assert!((a.mean_lost_gems_per_round - 2.0).abs() < f64::EPSILON);

        let b = &aggregates[1];
        assert!((b.std_winning_score).abs() < f64::EPSILON);
        assert!((b.human_win_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(aggregate_balance(&[]).is_empty());
    }
}
