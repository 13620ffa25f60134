//! One estimation cycle: sample, estimate, record, persist.
//!
//! Everything a run needs arrives in a [`SessionConfig`]; there is no
//! process-wide state. The cycle is:
//!
//! 1. validate the point count
//! 2. load the stored ledger, if any
//! 3. draw the batch and count inside points
//! 4. compute the estimate and percent error; seed the ledger with this
//!    record if none was stored
//! 5. append the record unless its estimate repeats the last one
//! 6. apply the retention cap, if any
//! 7. persist the full ledger
//!
//! Any failure returns before step 7, so the stored ledger is untouched.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::engine::rng::PiRng;
use crate::error::PiResult;
use crate::estimate::{EstimateRecord, PI_TRUE};
use crate::ledger::{AppendOutcome, ConvergenceLedger, FileLedgerStore, LedgerStore};
use crate::sampler::{SampleBatch, Sampler, MAX_POINTS, MIN_POINTS};

/// Request-scoped settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Points to draw.
    pub n_points: u64,
    /// Fixed seed, or `None` for an entropy seed.
    pub seed: Option<u64>,
    /// Ledger file location.
    pub ledger_path: PathBuf,
    /// Retention cap for the ledger.
    pub max_records: Option<usize>,
    /// zstd level for the ledger payload.
    pub compression_level: i32,
}

impl SessionConfig {
    /// Session for `n_points` using defaults for everything else.
    #[must_use]
    pub fn new(n_points: u64) -> Self {
        Self::from_app_config(&AppConfig::default(), Some(n_points))
    }

    /// Derive a session from application config. `n_points` overrides the
    /// configured default point count.
    #[must_use]
    pub fn from_app_config(config: &AppConfig, n_points: Option<u64>) -> Self {
        Self {
            n_points: n_points.unwrap_or(config.sampling.default_points),
            seed: config.sampling.seed,
            ledger_path: config.ledger.path.clone(),
            max_records: config.ledger.max_records,
            compression_level: config.ledger.compression_level,
        }
    }

    /// Override the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// Override the ledger path.
    #[must_use]
    pub fn with_ledger_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.ledger_path = path;
        }
        self
    }

    /// File store described by this session.
    #[must_use]
    pub fn file_store(&self) -> FileLedgerStore {
        FileLedgerStore::new(&self.ledger_path).with_compression_level(self.compression_level)
    }
}

/// Everything a run hands back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// The π estimate from this run.
    pub pi_estimate: f64,
    /// Percent error of this run's estimate.
    pub error_percent: f64,
    /// True value of π, for display next to the estimate.
    pub pi_true: f64,
    /// Record this run produced.
    pub record: EstimateRecord,
    /// Whether the record was added to the ledger.
    pub appended: bool,
    /// Whether the ledger was created by this run.
    pub seeded: bool,
    /// Records dropped by the retention cap.
    pub evicted: usize,
    /// Seed the sampler ran with.
    pub seed: u64,
    /// Full ledger after this run.
    pub ledger: ConvergenceLedger,
    /// Sampled points, for the scatter view.
    #[serde(skip)]
    pub batch: SampleBatch,
}

/// Run one cycle against `store` with `rng`.
///
/// # Errors
///
/// Returns `InvalidArgument` for a point count outside `[1, 10000]`,
/// `StorageCorrupt` if the stored ledger cannot be decoded, or an I/O error
/// if it cannot be read or written.
pub fn run_cycle<S: LedgerStore>(
    config: &SessionConfig,
    store: &mut S,
    rng: &mut PiRng,
) -> PiResult<RunOutcome> {
    let sampler = Sampler::new(config.n_points)?;

    let existing = store.load()?;

    let batch = sampler.run(rng);
    let record = EstimateRecord::from_batch(&batch)?;
    debug!(
        n = record.n_points,
        inside = batch.inside_count(),
        seed = rng.master_seed(),
        "sampled batch"
    );

    let seeded = existing.is_none();
    let mut ledger = ConvergenceLedger::existing_or_seeded(existing, record);
    let outcome = ledger.append(record);
    let evicted = config
        .max_records
        .map_or(0, |cap| ledger.enforce_retention(cap));

    match outcome {
        AppendOutcome::Appended => debug!(records = ledger.len(), "appended record"),
        AppendOutcome::Duplicate => {
            debug!(estimate = record.pi_estimate, "estimate repeats last record, not appended");
        }
    }

    store.persist(&ledger)?;

    info!(
        n = record.n_points,
        estimate = record.pi_estimate,
        error_percent = record.error_percent,
        records = ledger.len(),
        location = %store.location(),
        "estimate complete"
    );

    Ok(RunOutcome {
        pi_estimate: record.pi_estimate,
        error_percent: record.error_percent,
        pi_true: PI_TRUE,
        record,
        appended: outcome.appended(),
        seeded,
        evicted,
        seed: rng.master_seed(),
        ledger,
        batch,
    })
}

/// Run one cycle against the session's ledger file.
///
/// # Errors
///
/// See [`run_cycle`].
pub fn run_estimate(config: &SessionConfig) -> PiResult<RunOutcome> {
    let mut store = config.file_store();
    let mut rng = PiRng::from_seed_or_entropy(config.seed);
    run_cycle(config, &mut store, &mut rng)
}

/// Pick a point count uniformly from `[1, 10000]`.
pub fn random_point_count(rng: &mut PiRng) -> u64 {
    rng.gen_range_u64(MIN_POINTS, MAX_POINTS)
}
