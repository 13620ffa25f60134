//! Convergence ledger.
//!
//! An ordered history of [`EstimateRecord`]s, one per run that produced a
//! new estimate. Insertion order is run order. A record is appended only when
//! its estimate differs from the last recorded estimate; `N_points` and the
//! error are not compared, so two runs with different point counts that land
//! on the same estimate keep only the first. That loses data and is likely
//! unintended, but stored ledgers depend on it and it is kept as is.
//!
//! Storage lives behind [`LedgerStore`]; see [`store`].

pub mod store;

use serde::Serialize;

use crate::estimate::EstimateRecord;

pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore, DEFAULT_LEDGER_PATH};

/// Result of offering a record to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was added at the end.
    Appended,
    /// The record's estimate equals the last estimate; nothing changed.
    Duplicate,
}

impl AppendOutcome {
    /// Whether the ledger grew.
    #[must_use]
    pub const fn appended(self) -> bool {
        matches!(self, Self::Appended)
    }
}

/// Append-only history of estimates. Never empty.
///
/// Serializes as a flat list of records. Deserialization goes through
/// [`from_records`](Self::from_records) so an empty list is never accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConvergenceLedger {
    records: Vec<EstimateRecord>,
}

impl ConvergenceLedger {
    /// Start a ledger with its first record.
    #[must_use]
    pub fn seeded(first: EstimateRecord) -> Self {
        Self {
            records: vec![first],
        }
    }

    /// Rebuild a ledger from stored records. Returns `None` for an empty list.
    #[must_use]
    pub fn from_records(records: Vec<EstimateRecord>) -> Option<Self> {
        if records.is_empty() {
            None
        } else {
            Some(Self { records })
        }
    }

    /// Use `existing` if present, otherwise seed a new ledger with `first`.
    #[must_use]
    pub fn existing_or_seeded(existing: Option<Self>, first: EstimateRecord) -> Self {
        existing.unwrap_or_else(|| Self::seeded(first))
    }

    /// All records in run order.
    #[must_use]
    pub fn records(&self) -> &[EstimateRecord] {
        &self.records
    }

    /// Most recent record.
    #[must_use]
    pub fn last(&self) -> &EstimateRecord {
        // Non-empty by construction.
        &self.records[self.records.len() - 1]
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append `record` unless its estimate equals the last estimate.
    #[allow(clippy::float_cmp)]
    pub fn append(&mut self, record: EstimateRecord) -> AppendOutcome {
        if record.pi_estimate == self.last().pi_estimate {
            AppendOutcome::Duplicate
        } else {
            self.records.push(record);
            AppendOutcome::Appended
        }
    }

    /// Consuming form of [`append`](Self::append).
    #[must_use]
    pub fn with_appended(mut self, record: EstimateRecord) -> Self {
        let _ = self.append(record);
        self
    }

    /// Evict the oldest records so at most `max_records` remain.
    ///
    /// `max_records` of zero is treated as one, since a ledger is never empty.
    /// Returns the number of evicted records.
    pub fn enforce_retention(&mut self, max_records: usize) -> usize {
        let cap = max_records.max(1);
        let excess = self.records.len().saturating_sub(cap);
        if excess > 0 {
            self.records.drain(..excess);
        }
        excess
    }

    /// Record with the lowest percent error, earliest one wins ties.
    #[must_use]
    pub fn best(&self) -> &EstimateRecord {
        let mut best = &self.records[0];
        for record in &self.records[1..] {
            if record.error_percent < best.error_percent {
                best = record;
            }
        }
        best
    }

    /// Consume the ledger, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<EstimateRecord> {
        self.records
    }
}
