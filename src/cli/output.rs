//! CLI output formatting.
//!
//! Formatting is split from printing so tests can inspect the text.

use std::fmt::Write as _;

use crate::error::{PiError, PiResult};
use crate::ledger::ConvergenceLedger;
use crate::sampler::SampleBatch;
use crate::session::RunOutcome;
use crate::views::sample_scatter;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print version information.
pub fn print_version() {
    println!(
        "montepi {} ({})",
        env!("MONTEPI_VERSION"),
        env!("MONTEPI_GIT_HASH")
    );
}

/// Print help message.
pub fn print_help() {
    println!(
        r"montepi - Monte Carlo estimation of π with a convergence ledger

USAGE:
    montepi <COMMAND> [OPTIONS]

COMMANDS:
    run [N]                     Estimate π from N random points (1-10000);
                                N defaults to sampling.default_points
        --seed <S>              Use a fixed seed
        --ledger <PATH>         Ledger file (default: pkled_data.bin)
        --config <FILE>         YAML configuration file
        --points                Print the sampled points as JSON
        -v, --verbose           Enable debug logging

    random                      Same as run, with N drawn from 1-10000
                                (accepts the same options)

    history                     Print the convergence ledger
        --ledger <PATH>         Ledger file
        --config <FILE>         YAML configuration file
        --json                  Print JSON instead of a table

    views                       Print chart series for the ledger as JSON
        --ledger <PATH>         Ledger file
        --config <FILE>         YAML configuration file
        --raw-log-x             Log point-count axis on the raw chart
        --error-log-x           Log point-count axis on the error chart
        --error-log-y           Log error axis on the error chart
        --color <n|error>       Trial chart coloring (default: n)
        --range <LO> <HI>       Trial chart y window within 0-4

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    montepi run 1000
    montepi run 250 --seed 42 --ledger runs/ledger.bin
    montepi random
    montepi views --raw-log-x --error-log-x --color error --range 2.5 3.5
"
    );
}

/// Text block describing one run.
#[must_use]
pub fn format_run_outcome(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    let status = if outcome.seeded {
        "new ledger started"
    } else if outcome.appended {
        "recorded"
    } else {
        "same estimate as last run, not recorded"
    };

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Number of points:        {}", outcome.record.n_points);
    let _ = writeln!(out, "Points inside circle:    {}", outcome.batch.inside_count());
    let _ = writeln!(out, "Your estimation of π:    {}", outcome.pi_estimate);
    let _ = writeln!(out, "True value of π:         {}", outcome.pi_true);
    let _ = writeln!(
        out,
        "Percent error:           {} %",
        outcome.record.display_error()
    );
    let _ = writeln!(out, "Seed:                    {}", outcome.seed);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Ledger: {} records ({status})", outcome.ledger.len());
    if outcome.evicted > 0 {
        let _ = writeln!(out, "Retention dropped {} oldest records", outcome.evicted);
    }
    out
}

/// Print one run.
pub fn print_run_outcome(outcome: &RunOutcome) {
    print!("{}", format_run_outcome(outcome));
}

/// Ledger as an aligned table, one row per trial.
#[must_use]
pub fn format_history_table(ledger: &ConvergenceLedger) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:>8}  {:>10}  {:>10}", "trial", "N_points", "pi_est", "error");
    for (trial, r) in ledger.records().iter().enumerate() {
        let _ = writeln!(
            out,
            "{trial:>6}  {:>8}  {:>10.6}  {:>9.3}%",
            r.n_points, r.pi_estimate, r.error_percent
        );
    }
    let best = ledger.best();
    let _ = writeln!(
        out,
        "\n{} records, best: N={} π̂={:.6} ({:.3}%)",
        ledger.len(),
        best.n_points,
        best.pi_estimate,
        best.error_percent
    );
    out
}

/// Ledger as pretty JSON.
///
/// # Errors
///
/// Returns `Serialization` if encoding fails.
pub fn format_history_json(ledger: &ConvergenceLedger) -> PiResult<String> {
    serde_json::to_string_pretty(ledger)
        .map_err(|e| PiError::serialization(format!("JSON serialization failed: {e}")))
}

/// Sampled points as a scatter series in JSON.
///
/// # Errors
///
/// Returns `Serialization` if encoding fails.
pub fn format_points_json(batch: &SampleBatch) -> PiResult<String> {
    serde_json::to_string(&sample_scatter(batch))
        .map_err(|e| PiError::serialization(format!("JSON serialization failed: {e}")))
}
