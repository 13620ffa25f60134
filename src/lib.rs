//! # montepi
//!
//! Monte Carlo estimation of π with a persisted convergence ledger.
//!
//! Each run draws N points uniformly in the square `[-1, 1) × [-1, 1)`,
//! estimates π as `4 · inside / N`, and appends the result to a ledger
//! file so convergence can be charted across runs.
//!
//! ## Example
//!
//! ```rust
//! use montepi::prelude::*;
//!
//! let mut store = MemoryLedgerStore::new();
//! let mut rng = PiRng::new(42);
//! let outcome = run_cycle(&SessionConfig::new(1000), &mut store, &mut rng).unwrap();
//!
//! assert_eq!(outcome.ledger.len(), 1);
//! assert!((0.0..=4.0).contains(&outcome.pi_estimate));
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod ledger;
pub mod logging;
pub mod sampler;
pub mod session;
pub mod views;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{AppConfig, AppConfigBuilder};
    pub use crate::engine::rng::PiRng;
    pub use crate::error::{PiError, PiResult};
    pub use crate::estimate::{EstimateRecord, PI_TRUE};
    pub use crate::ledger::{
        AppendOutcome, ConvergenceLedger, FileLedgerStore, LedgerStore, MemoryLedgerStore,
    };
    pub use crate::sampler::{sample, Point, SampleBatch, Sampler};
    pub use crate::session::{run_cycle, run_estimate, RunOutcome, SessionConfig};
    pub use crate::views::{ColorBy, ConvergenceViews, ViewOptions, YRange};
}

/// Re-export for public API
pub use error::{PiError, PiResult};
