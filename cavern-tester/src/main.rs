mod logic;
mod util;

use anyhow::{Context, Result, bail};
use cavern_game::{CpuDifficulty, EndCondition, GemModifier};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{
    BalanceAggregate, GameRecord, LogicTester, ScenarioConfig, ScenarioResult, SeatStrategy,
    aggregate_balance, resolve_seed_inputs,
};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "cavern-tester", version = "0.1.0")]
#[command(about = "Headless game simulations and bookkeeping checks for the Cavern rules engine")]
struct Args {
    /// Seeds to run (comma-separated integers or `start..end` ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Games per seed and scenario
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Number of human seats, driven by the seat strategies
    #[arg(long, default_value_t = 1)]
    humans: usize,

    /// Number of CPU seats
    #[arg(long, default_value_t = 3)]
    cpus: usize,

    /// Rounds per game
    #[arg(long, default_value_t = 8)]
    rounds: u32,

    /// Seat strategies for the humans (comma-separated, or `all`)
    #[arg(long, default_value = "cautious")]
    strategies: String,

    /// CPU difficulties (comma-separated, or `all`)
    #[arg(long, default_value = "normal")]
    difficulties: String,

    /// End condition keys (comma-separated, or `all`)
    #[arg(long, default_value = "standard")]
    end_conditions: String,

    /// Gem modifier keys such as `multiplier:2` (comma-separated, or `all`)
    #[arg(long, default_value = "standard")]
    gem_modifiers: String,

    /// List the available rules and strategies and exit
    #[arg(long)]
    list_rules: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_rules(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = build_scenarios(&args)?;
    let seed_tokens = split_csv(&args.seeds);
    let seed_infos = resolve_seed_inputs(&seed_tokens)?;
    for info in &seed_infos {
        log::debug!("seed {} from token {:?}", info.seed, info.token);
    }
    let seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();
    log::info!(
        "running {} scenarios over {} seeds, {} games each",
        scenarios.len(),
        seeds.len(),
        args.iterations
    );

    let (results, records) = run_scenarios(&args, &scenarios, &seeds);
    let aggregates = aggregate_balance(&records);

    write_reports(&args, &results, &records, &aggregates, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_rules(args: &Args) -> Result<bool> {
    if !args.list_rules {
        return Ok(false);
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    let out = output_target.writer();
    writeln!(out, "End conditions:")?;
    for condition in EndCondition::CATALOGUE {
        writeln!(out, "  {:25} - round ends when {}", condition.key(), condition)?;
    }
    writeln!(out, "Gem modifiers:")?;
    for modifier in GemModifier::catalogue() {
        writeln!(out, "  {:25} - {}", modifier.key(), modifier)?;
    }
    writeln!(out, "CPU difficulties:")?;
    for difficulty in CpuDifficulty::ALL {
        writeln!(out, "  {difficulty}")?;
    }
    writeln!(out, "Seat strategies:")?;
    for strategy in SeatStrategy::ALL {
        writeln!(out, "  {:25} - {}", strategy.key(), strategy)?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "💎 Cavern Simulation Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

/// Expand a comma-separated list, with `all` standing for every entry of
/// `catalogue`.
fn expand_keys<T, F>(raw: &str, catalogue: &[T], what: &str, parse: F) -> Result<Vec<T>>
where
    T: Clone + PartialEq,
    F: Fn(&str) -> Option<T>,
{
    let mut expanded: Vec<T> = Vec::new();
    for key in split_csv(raw) {
        let items = if key.eq_ignore_ascii_case("all") {
            catalogue.to_vec()
        } else {
            match parse(&key) {
                Some(item) => vec![item],
                None => bail!("Unknown {what}: {key}"),
            }
        };
        for item in items {
            if !expanded.contains(&item) {
                expanded.push(item);
            }
        }
    }
    if expanded.is_empty() {
        bail!("No {what} selected");
    }
    Ok(expanded)
}

fn parse_difficulty(key: &str) -> Option<CpuDifficulty> {
    CpuDifficulty::ALL
        .into_iter()
        .find(|difficulty| difficulty.label().eq_ignore_ascii_case(key))
}

/// Every combination of the selected rules, validated up front.
fn build_scenarios(args: &Args) -> Result<Vec<ScenarioConfig>> {
    let strategies = expand_keys(
        &args.strategies,
        &SeatStrategy::ALL,
        "seat strategy",
        SeatStrategy::from_key,
    )?;
    let difficulties = expand_keys(
        &args.difficulties,
        &CpuDifficulty::ALL,
        "CPU difficulty",
        parse_difficulty,
    )?;
    let end_conditions = expand_keys(
        &args.end_conditions,
        &EndCondition::CATALOGUE,
        "end condition",
        EndCondition::from_key,
    )?;
    let gem_modifiers = expand_keys(
        &args.gem_modifiers,
        &GemModifier::catalogue(),
        "gem modifier",
        GemModifier::from_key,
    )?;

    let mut scenarios = Vec::new();
    for &strategy in &strategies {
        for &difficulty in &difficulties {
            for &end_condition in &end_conditions {
                for &gem_modifier in &gem_modifiers {
                    let config = ScenarioConfig {
                        humans: args.humans,
                        cpus: args.cpus,
                        difficulty,
                        end_condition,
                        gem_modifier,
                        rounds: args.rounds,
                        strategy,
                    };
                    config.settings()?;
                    scenarios.push(config);
                }
            }
        }
    }
    Ok(scenarios)
}

fn run_scenarios(
    args: &Args,
    scenarios: &[ScenarioConfig],
    seeds: &[u64],
) -> (Vec<ScenarioResult>, Vec<GameRecord>) {
    println!("{}", "🧠 Running Simulations".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(args.verbose);
    let mut results = Vec::new();
    let mut records = Vec::new();
    for scenario in scenarios {
        let run = tester.run_scenario(scenario, seeds, args.iterations);
        results.extend(run.results);
        records.extend(run.records);
    }
    (results, records)
}

fn write_reports(
    args: &Args,
    results: &[ScenarioResult],
    records: &[GameRecord],
    aggregates: &[BalanceAggregate],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, results, aggregates)?;
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Cavern Simulation Results\n\n_No games played._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results, aggregates)?;
            }
        }
        "csv" => {
            logic::reports::generate_csv_report(&mut output_target, records)?;
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No games played.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    aggregates,
                    duration,
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            seeds: "1337".to_string(),
            iterations: 1,
            humans: 1,
            cpus: 3,
            rounds: 2,
            strategies: "cautious".to_string(),
            difficulties: "normal".to_string(),
            end_conditions: "standard".to_string(),
            gem_modifiers: "standard".to_string(),
            list_rules: false,
            report: "console".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cavern-main-{label}-{}.txt", std::process::id()))
    }

    #[test]
    fn build_scenarios_takes_the_cartesian_product() {
        let args = Args {
            strategies: "greedy,mirror".to_string(),
            difficulties: "all".to_string(),
            gem_modifiers: "standard,multiplier:2".to_string(),
            ..base_args()
        };
        let scenarios = build_scenarios(&args).unwrap();
        assert_eq!(scenarios.len(), 2 * 3 * 2);
        assert_eq!(scenarios[0].name(), "greedy/easy/standard/standard");
    }

    #[test]
    fn expand_keys_dedups_and_rejects_unknown() {
        let conditions = expand_keys(
            "standard,all",
            &EndCondition::CATALOGUE,
            "end condition",
            EndCondition::from_key,
        )
        .unwrap();
        assert_eq!(conditions, EndCondition::CATALOGUE.to_vec());

        let err = expand_keys("sudden-death", &EndCondition::CATALOGUE, "end condition", |key| {
            EndCondition::from_key(key)
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown end condition: sudden-death");
    }

    #[test]
    fn build_scenarios_rejects_invalid_tables() {
        let args = Args {
            humans: 0,
            cpus: 2,
            ..base_args()
        };
        let err = build_scenarios(&args).unwrap_err();
        assert!(format!("{err:#}").contains("invalid game settings"));
    }

    #[test]
    fn run_scenarios_covers_every_seed() {
        let args = Args {
            iterations: 2,
            ..base_args()
        };
        let scenarios = build_scenarios(&args).unwrap();
        let (results, records) = run_scenarios(&args, &scenarios, &[1, 2]);
        assert_eq!(results.len(), 2);
        assert_eq!(records.len(), 4);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn write_reports_emits_csv_output() {
        let temp = temp_file("csv");
        let args = Args {
            report: "csv".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        let scenarios = build_scenarios(&args).unwrap();
        let (results, records) = run_scenarios(&args, &scenarios, &[3]);
        let aggregates = aggregate_balance(&records);
        write_reports(&args, &results, &records, &aggregates, Instant::now()).unwrap();
        let content = std::fs::read_to_string(&temp).unwrap();
        assert!(content.starts_with("scenario,seed,"));
        assert_eq!(content.lines().count(), 2);
        let _ = std::fs::remove_file(temp);
    }

    #[test]
    fn maybe_list_rules_writes_output() {
        let temp = temp_file("rules");
        let args = Args {
            list_rules: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_rules(&args).unwrap());
        let content = std::fs::read_to_string(&temp).unwrap();
        assert!(content.contains("three-relics-drawn"));
        assert!(content.contains("left-reward:3"));
        assert!(content.contains("coinflip"));
        let _ = std::fs::remove_file(temp);
    }

    #[test]
    fn maybe_list_rules_is_a_no_op_when_disabled() {
        assert!(!maybe_list_rules(&base_args()).unwrap());
    }
}
