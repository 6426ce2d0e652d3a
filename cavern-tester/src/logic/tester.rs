use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::simulation::{GameRecord, ScenarioConfig, run_game};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Everything one scenario sweep produced.
#[derive(Debug, Default)]
pub struct ScenarioRun {
    pub results: Vec<ScenarioResult>,
    pub records: Vec<GameRecord>,
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run `iterations` games per seed. Iteration `i` of seed `s` plays
    /// with seed `s + i`.
    pub fn run_scenario(
        &self,
        config: &ScenarioConfig,
        seeds: &[u64],
        iterations: usize,
    ) -> ScenarioRun {
        let mut run = ScenarioRun::default();
        let name = config.name();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} ({} humans, {} CPUs, seed: {})",
                    name.bright_white(),
                    config.humans,
                    config.cpus,
                    seed
                );
            }

            let (result, records) = self.run_single_scenario(config, &name, seed, iterations);
            run.results.push(result);
            run.records.extend(records);
        }

        run
    }

    fn run_single_scenario(
        &self,
        config: &ScenarioConfig,
        name: &str,
        seed: u64,
        iterations: usize,
    ) -> (ScenarioResult, Vec<GameRecord>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut records = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            match run_game(config, iteration_seed) {
                Ok(record) if record.violations.is_empty() => {
                    let duration = start_time.elapsed();
                    successes += 1;
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) turns:{} winners:{}",
                            i + 1,
                            iterations,
                            record.total_turns(),
                            record.winners.join(", ")
                        );
                    }
                    records.push(record);
                }
                Ok(record) => {
                    let message = format!(
                        "Iteration {} (seed {}): {}",
                        i + 1,
                        iteration_seed,
                        record.violations.join("; ")
                    );
                    if self.verbose {
                        println!("  ❌ {}", message.red());
                    }
                    failures.push(message);
                    records.push(record);
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {}): {err:#}", i + 1, iteration_seed);
                    if self.verbose {
                        println!("  ❌ {}", message.red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        let result = ScenarioResult {
            scenario_name: name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        };
        (result, records)
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::policy::SeatStrategy;
    use cavern_game::{CpuDifficulty, EndCondition, GemModifier};

    fn config(humans: usize) -> ScenarioConfig {
        ScenarioConfig {
            humans,
            cpus: 3,
            difficulty: CpuDifficulty::Hard,
            end_condition: EndCondition::FirstTrapEnds,
            gem_modifier: GemModifier::gem_multiplier(2.0),
            rounds: 2,
            strategy: SeatStrategy::Cautious,
        }
    }

    #[test]
    fn one_result_per_seed() {
        let run = LogicTester::new(false).run_scenario(&config(2), &[1, 2, 3], 2);
        assert_eq!(run.results.len(), 3);
        assert_eq!(run.records.len(), 6);
        assert!(run.results.iter().all(|r| r.passed));
        assert!(run.results.iter().all(|r| r.successful_iterations == 2));
    }

    #[test]
    fn invalid_configs_fail_every_iteration() {
        let mut bad = config(0);
        bad.cpus = 0;
        let run = LogicTester::new(false).run_scenario(&bad, &[5], 3);
        let result = &run.results[0];
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 3);
        assert_eq!(result.average_duration, Duration::ZERO);
        assert!(run.records.is_empty());
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "x".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
    }
}
