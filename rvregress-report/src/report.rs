//! Report Data Structures

use chrono::{DateTime, Utc};
use rvregress_core::WorkerTally;
use serde::{Deserialize, Serialize};

/// Complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata.
    pub meta: ReportMeta,
    /// One tally per worker slot.
    pub worker_tallies: Vec<WorkerTally>,
    /// Aggregate counts.
    pub summary: RunSummary,
}

/// Run metadata captured alongside the counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Harness version.
    pub version: String,
    /// When the run completed.
    pub timestamp: DateTime<Utc>,
    /// Resolved architecture string, e.g. `RV64IMAFD`.
    pub arch: String,
    /// Test families the architecture selected.
    pub families: Vec<String>,
    /// Worker count used for the run.
    pub workers: usize,
}

/// Aggregate pass/fail counts for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Candidates discovered.
    pub total: usize,
    /// Tests actually executed.
    pub executed: u64,
    /// Tests that printed `PASS`.
    pub passed: u64,
    /// Executed minus passed.
    pub failed: u64,
}

/// Sum the per-worker tallies into the final summary.
///
/// `executed` should equal `total` given the claim semantics of the work
/// cursor, but the aggregation does not assume it.
pub fn aggregate(total: usize, tallies: &[WorkerTally]) -> RunSummary {
    let executed: u64 = tallies.iter().map(|t| t.executed).sum();
    let passed: u64 = tallies.iter().map(|t| t.passed).sum();
    RunSummary {
        total,
        executed,
        passed,
        failed: executed - passed,
    }
}
