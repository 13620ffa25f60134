//! CLI command handlers.
//!
//! Each handler returns `PiResult<()>`; [`run_cli`] turns errors, including
//! rejected command-line input, into a printed message and a failure exit
//! code.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::debug;

use crate::config::AppConfig;
use crate::engine::rng::PiRng;
use crate::error::{PiError, PiResult};
use crate::ledger::{ConvergenceLedger, FileLedgerStore, LedgerStore};
use crate::logging;
use crate::session::{random_point_count, run_cycle, SessionConfig};
use crate::views::{ConvergenceViews, ViewOptions, YRange};

use super::args::{LedgerSource, RunOptions, ViewArgs};
use super::output::{
    format_history_json, format_history_table, format_points_json, print_help,
    print_run_outcome, print_version,
};
use super::{Args, Command};

/// Main CLI entry point.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch a parsed command.
///
/// # Errors
///
/// Returns whatever error the command hit.
pub fn execute(args: Args) -> PiResult<()> {
    match args.command {
        Command::Run { n_points, options } => run_estimate(n_points, &options),
        Command::Random { options } => run_random(&options),
        Command::History { source, json } => show_history(&source, json),
        Command::Views(view) => show_views(&view),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
        Command::Invalid(input) => Err(input.into()),
    }
}

fn load_config(path: Option<&Path>) -> PiResult<AppConfig> {
    path.map_or_else(|| Ok(AppConfig::default()), AppConfig::load)
}

/// Session and RNG for a run, from config plus CLI overrides. Installs the
/// log subscriber.
fn prepare_run(options: &RunOptions) -> PiResult<(SessionConfig, PiRng)> {
    let config = load_config(options.config_path.as_deref())?;
    logging::init(&config.logging.filter, options.verbose);

    let session = SessionConfig::from_app_config(&config, None)
        .with_seed(options.seed)
        .with_ledger_path(options.ledger_path.clone());
    let rng = PiRng::from_seed_or_entropy(session.seed);
    Ok((session, rng))
}

fn finish_run(session: &SessionConfig, rng: &mut PiRng, options: &RunOptions) -> PiResult<()> {
    let mut store = session.file_store();
    let outcome = run_cycle(session, &mut store, rng)?;

    print_run_outcome(&outcome);
    if options.show_points {
        println!("{}", format_points_json(&outcome.batch)?);
    }
    Ok(())
}

/// Run one estimate. `n_points` of `None` uses `sampling.default_points`.
///
/// # Errors
///
/// Returns configuration, input, or storage errors; the ledger is not
/// modified when an error is returned.
pub fn run_estimate(n_points: Option<u64>, options: &RunOptions) -> PiResult<()> {
    let (mut session, mut rng) = prepare_run(options)?;
    if let Some(n) = n_points {
        session.n_points = n;
    }
    finish_run(&session, &mut rng, options)
}

/// Run one estimate with a point count drawn from `[1, 10000]` by the same
/// RNG that then draws the points.
///
/// # Errors
///
/// See [`run_estimate`].
pub fn run_random(options: &RunOptions) -> PiResult<()> {
    let (mut session, mut rng) = prepare_run(options)?;
    session.n_points = random_point_count(&mut rng);
    debug!(n = session.n_points, "drew random point count");
    finish_run(&session, &mut rng, options)
}

fn ledger_path(source: &LedgerSource, config: &AppConfig) -> PathBuf {
    source
        .ledger_path
        .clone()
        .unwrap_or_else(|| config.ledger.path.clone())
}

/// Load the ledger named by `source`.
///
/// # Errors
///
/// Returns `LedgerMissing` if no ledger exists yet, or the store's load
/// error.
pub fn load_ledger(source: &LedgerSource) -> PiResult<ConvergenceLedger> {
    let config = load_config(source.config_path.as_deref())?;
    logging::init(&config.logging.filter, false);

    let store = FileLedgerStore::new(ledger_path(source, &config));
    store.load()?.ok_or_else(|| PiError::LedgerMissing {
        path: store.path().to_path_buf(),
    })
}

/// Print the ledger as a table or JSON.
///
/// # Errors
///
/// See [`load_ledger`].
pub fn show_history(source: &LedgerSource, json: bool) -> PiResult<()> {
    let ledger = load_ledger(source)?;
    if json {
        println!("{}", format_history_json(&ledger)?);
    } else {
        print!("{}", format_history_table(&ledger));
    }
    Ok(())
}

/// Build the chart series for the ledger.
///
/// # Errors
///
/// Returns `InvalidArgument` for a bad range, or a ledger load error.
pub fn build_views(view: &ViewArgs) -> PiResult<ConvergenceViews> {
    let options = ViewOptions {
        raw_log_x: view.raw_log_x,
        trial_color: view.color,
        trial_range: YRange::new(view.range.0, view.range.1)?,
        error_log_x: view.error_log_x,
        error_log_y: view.error_log_y,
    };
    let ledger = load_ledger(&view.source)?;
    Ok(ConvergenceViews::build(&ledger, &options))
}

/// Print the chart series as JSON.
///
/// # Errors
///
/// See [`build_views`].
pub fn show_views(view: &ViewArgs) -> PiResult<()> {
    println!("{}", build_views(view)?.to_json()?);
    Ok(())
}
