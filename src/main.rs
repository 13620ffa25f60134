//! montepi CLI - Monte Carlo π estimation
//!
//! Thin wrapper; all logic lives in `montepi::cli`.

use std::process::ExitCode;

use montepi::cli::{run_cli, Args};

fn main() -> ExitCode {
    run_cli(Args::parse())
}
