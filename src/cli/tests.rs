//! CLI module tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::args::{Args, Command, InvalidInput, LedgerSource, RunOptions, ViewArgs};
use super::commands::{build_views, execute, load_ledger, run_cli, run_estimate, run_random};
use super::output::{format_history_json, format_history_table, format_run_outcome};
use crate::config::AppConfig;
use crate::engine::rng::PiRng;
use crate::error::PiError;
use crate::estimate::EstimateRecord;
use crate::ledger::{ConvergenceLedger, FileLedgerStore, LedgerStore, MemoryLedgerStore};
use crate::session::{run_cycle, SessionConfig};
use crate::views::{AxisScale, ColorBy};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::tempdir;

fn run_options(ledger: &Path, seed: u64) -> RunOptions {
    RunOptions {
        seed: Some(seed),
        ledger_path: Some(ledger.to_path_buf()),
        ..RunOptions::default()
    }
}

fn source(ledger: &Path) -> LedgerSource {
    LedgerSource {
        ledger_path: Some(ledger.to_path_buf()),
        config_path: None,
    }
}

fn stored(ledger: &Path) -> ConvergenceLedger {
    FileLedgerStore::new(ledger).load().unwrap().unwrap()
}

fn is_failure(code: ExitCode) -> bool {
    format!("{code:?}") == format!("{:?}", ExitCode::FAILURE)
}

/// Name of the rejected argument, or panic if the command parsed.
fn rejected<const N: usize>(argv: [&str; N]) -> &'static str {
    match Args::parse_from(argv).command {
        Command::Invalid(InvalidInput { name, .. }) => name,
        other => panic!("expected Invalid, got {other:?}"),
    }
}

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_parse_no_args_shows_help() {
    let args = Args::parse_from(["montepi"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_help_variants() {
    for flag in ["-h", "--help", "help"] {
        assert_eq!(Args::parse_from(["montepi", flag]).command, Command::Help);
    }
}

#[test]
fn test_parse_version_variants() {
    for flag in ["-V", "--version", "version"] {
        assert_eq!(Args::parse_from(["montepi", flag]).command, Command::Version);
    }
}

#[test]
fn test_parse_unknown_command_is_rejected() {
    let args = Args::parse_from(["montepi", "bogus"]);
    assert_eq!(
        args.command,
        Command::Invalid(InvalidInput {
            name: "command",
            value: "bogus".to_string(),
            reason: "expected run, random, history, views, help or version".to_string(),
        })
    );
}

#[test]
fn test_parse_unknown_option_is_rejected() {
    assert_eq!(rejected(["montepi", "run", "10", "--fast"]), "option");
    assert_eq!(rejected(["montepi", "history", "--csv"]), "option");
    assert_eq!(rejected(["montepi", "views", "--log-x"]), "option");
}

#[test]
fn test_parse_run_plain() {
    let args = Args::parse_from(["montepi", "run", "1000"]);
    assert_eq!(
        args.command,
        Command::Run {
            n_points: Some(1000),
            options: RunOptions::default()
        }
    );
}

#[test]
fn test_parse_run_all_options() {
    let args = Args::parse_from([
        "montepi", "run", "250", "--seed", "42", "--ledger", "l.bin", "--config", "c.yaml",
        "--points", "-v",
    ]);
    let Command::Run { n_points, options } = args.command else {
        panic!("expected Run");
    };
    assert_eq!(n_points, Some(250));
    assert_eq!(options.seed, Some(42));
    assert_eq!(options.ledger_path, Some(PathBuf::from("l.bin")));
    assert_eq!(options.config_path, Some(PathBuf::from("c.yaml")));
    assert!(options.show_points);
    assert!(options.verbose);
}

#[test]
fn test_parse_run_without_count_uses_configured_default() {
    assert_eq!(
        Args::parse_from(["montepi", "run"]).command,
        Command::Run {
            n_points: None,
            options: RunOptions::default()
        }
    );

    let Command::Run { n_points, options } =
        Args::parse_from(["montepi", "run", "--seed", "3"]).command
    else {
        panic!("expected Run");
    };
    assert_eq!(n_points, None);
    assert_eq!(options.seed, Some(3));
}

#[test]
fn test_parse_run_non_numeric_count_is_rejected() {
    for bad in ["abc", "-5", "1.5", "99999999999999999999999"] {
        let args = Args::parse_from(["montepi", "run", bad]);
        let Command::Invalid(input) = args.command else {
            panic!("expected Invalid for {bad}");
        };
        assert_eq!(input.name, "n");
        assert_eq!(input.value, bad);
    }
}

#[test]
fn test_parse_run_out_of_range_count_is_deferred() {
    // Range checks happen when the command runs, not while parsing.
    let args = Args::parse_from(["montepi", "run", "0"]);
    assert!(matches!(
        args.command,
        Command::Run {
            n_points: Some(0),
            ..
        }
    ));
}

#[test]
fn test_parse_random() {
    let args = Args::parse_from(["montepi", "random", "--seed", "7"]);
    let Command::Random { options } = args.command else {
        panic!("expected Random");
    };
    assert_eq!(options.seed, Some(7));
}

#[test]
fn test_parse_bad_seed_is_rejected() {
    assert_eq!(rejected(["montepi", "random", "--seed", "xyz"]), "seed");
    assert_eq!(rejected(["montepi", "run", "500", "--seed", "4x2"]), "seed");
    assert_eq!(rejected(["montepi", "run", "500", "--seed", "-1"]), "seed");
    assert_eq!(rejected(["montepi", "run", "500", "--seed"]), "seed");
}

#[test]
fn test_parse_history() {
    let args = Args::parse_from(["montepi", "history", "--json", "--ledger", "x.bin"]);
    assert_eq!(
        args.command,
        Command::History {
            source: LedgerSource {
                ledger_path: Some(PathBuf::from("x.bin")),
                config_path: None,
            },
            json: true,
        }
    );
}

#[test]
fn test_parse_history_missing_ledger_value_is_rejected() {
    assert_eq!(rejected(["montepi", "history", "--ledger"]), "ledger");
}

#[test]
fn test_parse_views_defaults() {
    let args = Args::parse_from(["montepi", "views"]);
    assert_eq!(args.command, Command::Views(ViewArgs::default()));
}

#[test]
fn test_parse_views_all_options() {
    let args = Args::parse_from([
        "montepi",
        "views",
        "--raw-log-x",
        "--error-log-x",
        "--error-log-y",
        "--color",
        "error",
        "--range",
        "2.5",
        "3.5",
        "--config",
        "c.yaml",
    ]);
    let Command::Views(view) = args.command else {
        panic!("expected Views");
    };
    assert!(view.raw_log_x);
    assert!(view.error_log_x);
    assert!(view.error_log_y);
    assert_eq!(view.color, ColorBy::Error);
    assert_eq!(view.range, (2.5, 3.5));
    assert_eq!(view.source.config_path, Some(PathBuf::from("c.yaml")));
}

#[test]
fn test_parse_views_log_flags_are_independent() {
    let Command::Views(view) = Args::parse_from(["montepi", "views", "--raw-log-x"]).command
    else {
        panic!("expected Views");
    };
    assert!(view.raw_log_x);
    assert!(!view.error_log_x);
    assert!(!view.error_log_y);

    let Command::Views(view) = Args::parse_from(["montepi", "views", "--error-log-x"]).command
    else {
        panic!("expected Views");
    };
    assert!(!view.raw_log_x);
    assert!(view.error_log_x);
}

#[test]
fn test_parse_views_bad_color_is_rejected() {
    assert_eq!(
        rejected(["montepi", "views", "--color", "purple", "--raw-log-x"]),
        "color"
    );
}

#[test]
fn test_parse_views_bad_range_is_rejected() {
    assert_eq!(rejected(["montepi", "views", "--range", "1"]), "range");
    assert_eq!(rejected(["montepi", "views", "--range", "low", "3"]), "range");
}

// ============================================================================
// Command tests
// ============================================================================

#[test]
fn test_run_creates_then_grows_ledger() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");

    run_estimate(Some(1000), &run_options(&ledger, 1)).unwrap();
    assert_eq!(stored(&ledger).len(), 1);

    run_estimate(Some(1000), &run_options(&ledger, 2)).unwrap();
    let after = stored(&ledger);
    assert!((1..=2).contains(&after.len()));
}

#[test]
fn test_run_invalid_count_leaves_no_file() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");

    for n in [0, 10_001] {
        let err = run_estimate(Some(n), &run_options(&ledger, 1)).unwrap_err();
        assert!(matches!(err, PiError::InvalidArgument { .. }));
    }
    assert!(!ledger.exists());
}

#[test]
fn test_random_run_records_count_in_range() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");

    run_random(&run_options(&ledger, 99)).unwrap();
    let record = *stored(&ledger).last();
    assert!((1..=10_000).contains(&record.n_points));
}

#[test]
fn test_random_run_is_reproducible_with_seed() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");

    run_random(&run_options(&a, 5)).unwrap();
    run_random(&run_options(&b, 5)).unwrap();
    assert_eq!(stored(&a), stored(&b));
}

#[test]
fn test_run_uses_config_file() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("from_config.bin");
    let config_path = dir.path().join("montepi.yaml");
    let config = AppConfig::builder()
        .ledger_path(&ledger)
        .default_points(64)
        .seed(3)
        .build()
        .unwrap();
    std::fs::write(&config_path, config.to_yaml().unwrap()).unwrap();

    let options = RunOptions {
        config_path: Some(config_path),
        ..RunOptions::default()
    };
    run_estimate(None, &options).unwrap();
    assert_eq!(stored(&ledger).last().n_points, 64);

    run_estimate(Some(32), &options).unwrap();
    assert_eq!(stored(&ledger).last().n_points, 32);
}

#[test]
fn test_run_bad_config_file_fails() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bad.yaml");
    std::fs::write(&config_path, "sampling:\n  default_points: 0\n").unwrap();

    let options = RunOptions {
        config_path: Some(config_path),
        ledger_path: Some(dir.path().join("ledger.bin")),
        ..RunOptions::default()
    };
    assert!(run_estimate(Some(10), &options).is_err());
    assert!(!dir.path().join("ledger.bin").exists());
}

#[test]
fn test_run_on_corrupt_ledger_fails_and_keeps_file() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");
    std::fs::write(&ledger, b"not a ledger").unwrap();

    let err = run_estimate(Some(10), &run_options(&ledger, 1)).unwrap_err();
    assert!(err.is_storage_error());
    assert_eq!(std::fs::read(&ledger).unwrap(), b"not a ledger");
}

#[test]
fn test_load_ledger_missing_is_error() {
    let dir = tempdir().unwrap();
    let err = load_ledger(&source(&dir.path().join("none.bin"))).unwrap_err();
    assert!(matches!(err, PiError::LedgerMissing { .. }));
    assert!(err.is_storage_error());
}

#[test]
fn test_execute_history_after_run() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");
    run_estimate(Some(500), &run_options(&ledger, 8)).unwrap();

    for json in [false, true] {
        let command = Command::History {
            source: source(&ledger),
            json,
        };
        execute(Args { command }).unwrap();
    }
}

#[test]
fn test_execute_help_and_version() {
    execute(Args {
        command: Command::Help,
    })
    .unwrap();
    execute(Args {
        command: Command::Version,
    })
    .unwrap();
}

#[test]
fn test_build_views_from_stored_ledger() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");
    let seeded = ConvergenceLedger::seeded(EstimateRecord::new(100, 3.0, 4.507))
        .with_appended(EstimateRecord::new(1000, 3.2, 1.859));
    FileLedgerStore::new(&ledger).persist(&seeded).unwrap();

    let view = ViewArgs {
        source: source(&ledger),
        raw_log_x: true,
        error_log_x: false,
        error_log_y: true,
        color: ColorBy::Error,
        range: (2.5, 3.5),
    };
    let views = build_views(&view).unwrap();

    assert_eq!(views.raw.len(), 2);
    assert_eq!(views.raw.x_scale, AxisScale::Log);
    assert_eq!(views.trials.y_limits, Some((2.25, 3.75)));
    assert_eq!(views.errors.x_scale, AxisScale::Linear);
    assert_eq!(views.errors.y_scale, AxisScale::Log);

    let error_only = ViewArgs {
        source: source(&ledger),
        error_log_x: true,
        ..ViewArgs::default()
    };
    let views = build_views(&error_only).unwrap();
    assert_eq!(views.raw.x_scale, AxisScale::Linear);
    assert_eq!(views.errors.x_scale, AxisScale::Log);
}

#[test]
fn test_build_views_rejects_bad_range() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");
    FileLedgerStore::new(&ledger)
        .persist(&ConvergenceLedger::seeded(EstimateRecord::new(1, 4.0, 27.324)))
        .unwrap();

    let view = ViewArgs {
        source: source(&ledger),
        range: (3.5, 2.5),
        ..ViewArgs::default()
    };
    assert!(matches!(
        build_views(&view).unwrap_err(),
        PiError::InvalidArgument { .. }
    ));
}

#[test]
fn test_cli_rejects_bad_count_with_failure_exit() {
    assert!(is_failure(run_cli(Args::parse_from(["montepi", "run", "-5"]))));
    assert!(is_failure(run_cli(Args::parse_from(["montepi", "bogus"]))));
}

#[test]
fn test_execute_invalid_input_is_invalid_argument() {
    let err = execute(Args::parse_from(["montepi", "run", "abc"])).unwrap_err();
    let PiError::InvalidArgument { name, value, .. } = &err else {
        panic!("expected InvalidArgument, got {err:?}");
    };
    assert_eq!(*name, "n");
    assert_eq!(value, "abc");
}

#[test]
fn test_bad_seed_leaves_no_ledger() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("ledger.bin");
    let ledger_arg = ledger.to_str().unwrap();

    let args = Args::parse_from(["montepi", "run", "500", "--seed", "4x2", "--ledger", ledger_arg]);
    assert!(is_failure(run_cli(args)));
    assert!(!ledger.exists());
}

// ============================================================================
// Output tests
// ============================================================================

#[test]
fn test_format_run_outcome_first_run() {
    let mut store = MemoryLedgerStore::new();
    let outcome = run_cycle(&SessionConfig::new(100), &mut store, &mut PiRng::new(42)).unwrap();
    let text = format_run_outcome(&outcome);

    assert!(text.contains("Number of points:        100"));
    assert!(text.contains("new ledger started"));
    assert!(text.contains("Seed:                    42"));
    assert!(!text.contains("Retention"));
}

#[test]
fn test_format_run_outcome_duplicate() {
    let mut store = MemoryLedgerStore::with_ledger(ConvergenceLedger::seeded(
        EstimateRecord::new(1, 0.5, 84.085),
    ));
    let mut rng = PiRng::new(5);
    run_cycle(&SessionConfig::new(1), &mut store, &mut rng).unwrap();
    let again = run_cycle(&SessionConfig::new(1), &mut store, &mut PiRng::new(5)).unwrap();

    assert!(format_run_outcome(&again).contains("not recorded"));
}

#[test]
fn test_format_history_table_rows_and_best() {
    let ledger = ConvergenceLedger::seeded(EstimateRecord::new(100, 3.0, 4.507))
        .with_appended(EstimateRecord::new(1, 4.0, 27.324));
    let table = format_history_table(&ledger);

    assert_eq!(table.lines().filter(|l| l.contains('%')).count(), 3);
    assert!(table.contains("2 records, best: N=100"));
}

#[test]
fn test_format_history_json_uses_column_names() {
    let ledger = ConvergenceLedger::seeded(EstimateRecord::new(100, 3.0, 4.507));
    let json = format_history_json(&ledger).unwrap();

    assert!(json.contains("\"N_points\": 100"));
    assert!(json.contains("\"pi_est\": 3.0"));
    assert!(json.contains("\"error\": 4.507"));
}

#[test]
fn test_format_points_json_is_scatter_series() {
    let batch = crate::sampler::SampleBatch::from_points(vec![
        crate::sampler::Point::new(0.1, 0.2),
        crate::sampler::Point::new(0.9, 0.9),
    ]);
    let json = super::output::format_points_json(&batch).unwrap();

    assert!(json.contains("\"title\":\"Sampled Points\""));
    assert!(json.contains("\"color\":1.0"));
    assert!(json.contains("\"color\":0.0"));
}
