//! CLI module for montepi.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! `main` parses arguments and hands them to [`run_cli`].

mod args;
mod commands;
mod output;

pub use args::{Args, Command, InvalidInput, LedgerSource, RunOptions, ViewArgs};
pub use commands::{build_views, execute, load_ledger, run_cli, run_estimate, run_random};
pub use output::{
    format_history_json, format_history_table, format_points_json, format_run_outcome,
    print_help, print_version,
};

#[cfg(test)]
mod tests;
