use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;
use super::balance::BalanceAggregate;
use super::simulation::GameRecord;

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [ScenarioResult],
    balance: &'a [BalanceAggregate],
}

pub fn generate_console_report<W: Write>(
    out: &mut W,
    results: &[ScenarioResult],
    aggregates: &[BalanceAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total runs: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(passed_tests, total_tests))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Games: {}/{} clean",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if !aggregates.is_empty() {
        writeln!(out, "{}", "⚖️  Balance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "==================".yellow())?;
        for aggregate in aggregates {
            writeln!(out, "{}", aggregate.scenario_name.bold())?;
            writeln!(
                out,
                "   Winning score: {:.1} ± {:.1} over {} games",
                aggregate.mean_winning_score, aggregate.std_winning_score, aggregate.games
            )?;
            writeln!(
                out,
                "   Per round: {:.1} turns, {:.2} relics, {:.1} gems lost",
                aggregate.mean_turns_per_round,
                aggregate.mean_relics_per_round,
                aggregate.mean_lost_gems_per_round
            )?;
            writeln!(
                out,
                "   Wins: humans {:.0}%, CPUs {:.0}%",
                aggregate.human_win_rate * 100.0,
                aggregate.cpu_win_rate * 100.0
            )?;
            writeln!(out, "   Endings: {}", ending_mix(aggregate))?;
        }
    }

    Ok(())
}

pub fn generate_json_report<W: Write>(
    out: &mut W,
    results: &[ScenarioResult],
    aggregates: &[BalanceAggregate],
) -> Result<()> {
    let report = JsonReport {
        results,
        balance: aggregates,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(
    out: &mut W,
    results: &[ScenarioResult],
    aggregates: &[BalanceAggregate],
) -> Result<()> {
    writeln!(out, "# Cavern Simulation Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {failed_tests}")?;
    writeln!(
        out,
        "- **Success rate**: {:.1}%\n",
        success_rate(passed_tests, total_tests)
    )?;

    writeln!(out, "## Detailed Results\n")?;

    for result in results {
        let status = if result.passed { "✅" } else { "❌" };

        writeln!(out, "### {} {} (seed {})\n", status, result.scenario_name, result.seed)?;
        writeln!(
            out,
            "- **Games**: {}/{} clean",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }

    if !aggregates.is_empty() {
        writeln!(out, "## Balance\n")?;
        writeln!(
            out,
            "| Scenario | Games | Winning score | Turns/round | Human wins | CPU wins | Endings |"
        )?;
        writeln!(out, "|---|---|---|---|---|---|---|")?;
        for aggregate in aggregates {
            writeln!(
                out,
                "| {} | {} | {:.1} ± {:.1} | {:.1} | {:.0}% | {:.0}% | {} |",
                aggregate.scenario_name,
                aggregate.games,
                aggregate.mean_winning_score,
                aggregate.std_winning_score,
                aggregate.mean_turns_per_round,
                aggregate.human_win_rate * 100.0,
                aggregate.cpu_win_rate * 100.0,
                ending_mix(aggregate)
            )?;
        }
    }

    Ok(())
}

/// One row per simulated game.
pub fn generate_csv_report<W: Write>(out: &mut W, records: &[GameRecord]) -> Result<()> {
    writeln!(
        out,
        "scenario,seed,rounds,turns,winning_score,winners,human_won,cpu_won,human_exits,violations"
    )?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{}",
            record.scenario_name,
            record.seed,
            record.rounds.len(),
            record.total_turns(),
            record.winning_score,
            record.winners.join(";"),
            record.human_won,
            record.cpu_won,
            record.human_exits,
            record.violations.len()
        )?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (passed as f64 / total as f64) * 100.0
    }
}

fn ending_mix(aggregate: &BalanceAggregate) -> String {
    aggregate
        .ending_mix
        .iter()
        .map(|(label, share)| format!("{label} {:.0}%", share * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}
