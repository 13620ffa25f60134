//! CLI argument parsing.
//!
//! Hand-rolled so the parser can be driven from tests with plain string
//! slices. Malformed input becomes [`Command::Invalid`], which fails when
//! executed so the process exits non-zero.

use std::path::PathBuf;

use crate::error::PiError;
use crate::views::ColorBy;

type ParseResult<T> = Result<T, InvalidInput>;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Command-line input the parser rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput {
    /// Argument or flag that was rejected.
    pub name: &'static str,
    /// The offending text.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidInput {
    fn new(name: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<InvalidInput> for PiError {
    fn from(input: InvalidInput) -> Self {
        Self::invalid_argument(input.name, input.value, input.reason)
    }
}

/// Options shared by the commands that run an estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Seed override.
    pub seed: Option<u64>,
    /// Ledger path override.
    pub ledger_path: Option<PathBuf>,
    /// YAML configuration file.
    pub config_path: Option<PathBuf>,
    /// Print the sampled points as JSON.
    pub show_points: bool,
    /// Enable debug logging.
    pub verbose: bool,
}

/// Where to find the ledger for read-only commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSource {
    /// Ledger path override.
    pub ledger_path: Option<PathBuf>,
    /// YAML configuration file.
    pub config_path: Option<PathBuf>,
}

/// Options for the `views` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewArgs {
    /// Ledger location.
    pub source: LedgerSource,
    /// Log x axis on the raw convergence chart.
    pub raw_log_x: bool,
    /// Log x axis on the error chart.
    pub error_log_x: bool,
    /// Log y axis on the error chart.
    pub error_log_y: bool,
    /// Trial chart coloring.
    pub color: ColorBy,
    /// Trial chart y window, validated when the command runs.
    pub range: (f64, f64),
}

impl Default for ViewArgs {
    fn default() -> Self {
        Self {
            source: LedgerSource::default(),
            raw_log_x: false,
            error_log_x: false,
            error_log_y: false,
            color: ColorBy::default(),
            range: (0.0, 4.0),
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run one estimate.
    Run {
        /// Requested point count, validated when the command runs. `None`
        /// uses the configured default.
        n_points: Option<u64>,
        /// Shared run options.
        options: RunOptions,
    },
    /// Run one estimate with a random point count.
    Random {
        /// Shared run options.
        options: RunOptions,
    },
    /// Print the ledger.
    History {
        /// Ledger location.
        source: LedgerSource,
        /// Print JSON instead of a table.
        json: bool,
    },
    /// Print chart series for the ledger as JSON.
    Views(ViewArgs),
    /// Show help
    Help,
    /// Show version
    Version,
    /// Input that could not be parsed.
    Invalid(InvalidInput),
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let rest = &args[2..];
        let parsed = match args[1].as_str() {
            "run" => Self::parse_run_command(rest),
            "random" => Self::parse_run_options(rest).map(|options| Command::Random { options }),
            "history" => Self::parse_history_command(rest),
            "views" => Self::parse_views_command(rest),
            "-h" | "--help" | "help" => Ok(Command::Help),
            "-V" | "--version" | "version" => Ok(Command::Version),
            unknown => Err(InvalidInput::new(
                "command",
                unknown,
                "expected run, random, history, views, help or version",
            )),
        };

        Self {
            command: parsed.unwrap_or_else(Command::Invalid),
        }
    }

    /// Value following the flag at `rest[i]`.
    fn value<'a>(rest: &'a [String], i: usize, flag: &'static str) -> ParseResult<&'a str> {
        rest.get(i + 1)
            .map(String::as_str)
            .ok_or_else(|| InvalidInput::new(flag, "", "missing value"))
    }

    fn unrecognized(flag: &str) -> InvalidInput {
        InvalidInput::new("option", flag, "unrecognized option")
    }

    fn parse_run_command(rest: &[String]) -> ParseResult<Command> {
        let (n_points, rest) = match rest.split_first() {
            Some((first, tail)) if !first.starts_with("--") && first.as_str() != "-v" => {
                let n = first.parse::<u64>().map_err(|_| {
                    InvalidInput::new("n", first, "point count must be a positive integer")
                })?;
                (Some(n), tail)
            }
            _ => (None, rest),
        };

        Ok(Command::Run {
            n_points,
            options: Self::parse_run_options(rest)?,
        })
    }

    fn parse_run_options(rest: &[String]) -> ParseResult<RunOptions> {
        let mut options = RunOptions::default();
        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "--seed" => {
                    let value = Self::value(rest, i, "seed")?;
                    let seed = value.parse::<u64>().map_err(|_| {
                        InvalidInput::new("seed", value, "must be an unsigned 64-bit integer")
                    })?;
                    options.seed = Some(seed);
                    i += 2;
                }
                "--ledger" => {
                    options.ledger_path = Some(PathBuf::from(Self::value(rest, i, "ledger")?));
                    i += 2;
                }
                "--config" => {
                    options.config_path = Some(PathBuf::from(Self::value(rest, i, "config")?));
                    i += 2;
                }
                "--points" => {
                    options.show_points = true;
                    i += 1;
                }
                "-v" | "--verbose" => {
                    options.verbose = true;
                    i += 1;
                }
                other => return Err(Self::unrecognized(other)),
            }
        }
        Ok(options)
    }

    /// Consume `--ledger`/`--config` at `rest[i]`. Returns the new index, or
    /// `None` if `rest[i]` is not a source flag.
    fn parse_source_flag(
        rest: &[String],
        i: usize,
        source: &mut LedgerSource,
    ) -> ParseResult<Option<usize>> {
        match rest[i].as_str() {
            "--ledger" => {
                source.ledger_path = Some(PathBuf::from(Self::value(rest, i, "ledger")?));
                Ok(Some(i + 2))
            }
            "--config" => {
                source.config_path = Some(PathBuf::from(Self::value(rest, i, "config")?));
                Ok(Some(i + 2))
            }
            _ => Ok(None),
        }
    }

    fn parse_history_command(rest: &[String]) -> ParseResult<Command> {
        let mut source = LedgerSource::default();
        let mut json = false;

        let mut i = 0;
        while i < rest.len() {
            if let Some(next) = Self::parse_source_flag(rest, i, &mut source)? {
                i = next;
                continue;
            }
            match rest[i].as_str() {
                "--json" => json = true,
                other => return Err(Self::unrecognized(other)),
            }
            i += 1;
        }

        Ok(Command::History { source, json })
    }

    fn parse_f64(value: &str) -> ParseResult<f64> {
        value
            .parse::<f64>()
            .map_err(|_| InvalidInput::new("range", value, "bounds must be numbers"))
    }

    fn parse_views_command(rest: &[String]) -> ParseResult<Command> {
        let mut view = ViewArgs::default();

        let mut i = 0;
        while i < rest.len() {
            if let Some(next) = Self::parse_source_flag(rest, i, &mut view.source)? {
                i = next;
                continue;
            }
            match rest[i].as_str() {
                "--raw-log-x" => {
                    view.raw_log_x = true;
                    i += 1;
                }
                "--error-log-x" => {
                    view.error_log_x = true;
                    i += 1;
                }
                "--error-log-y" => {
                    view.error_log_y = true;
                    i += 1;
                }
                "--color" => {
                    let value = Self::value(rest, i, "color")?;
                    view.color = value.parse::<ColorBy>().map_err(|_| {
                        InvalidInput::new("color", value, "expected 'n' or 'error'")
                    })?;
                    i += 2;
                }
                "--range" => {
                    let low = Self::parse_f64(Self::value(rest, i, "range")?)?;
                    let high = Self::parse_f64(Self::value(rest, i + 1, "range")?)?;
                    view.range = (low, high);
                    i += 3;
                }
                other => return Err(Self::unrecognized(other)),
            }
        }

        Ok(Command::Views(view))
    }
}
