//! Worker pool and shared results buffer.
//!
//! A fixed pool of workers drains the candidate list through the shared
//! [`WorkCursor`](crate::cursor::WorkCursor). Each worker owns a private
//! working directory (`<work_root>/worker_<i>`) for the pipeline's
//! fixed-name intermediate files; isolation of those directories, not
//! unique filenames, is what makes concurrent runs safe. Workers share no
//! mutable state beyond the cursor and their own slot in the results
//! buffer.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::thread;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::HarnessConfig;
use crate::cursor::WorkCursor;
use crate::pipeline::run_isa_test;

/// Per-worker execution tally, written exactly once into the worker's
/// results slot when its loop exhausts the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTally {
    /// Tests this worker ran.
    pub executed: u64,
    /// Tests whose simulator output contained `PASS`.
    pub passed: u64,
}

/// Fixed-size shared buffer of per-worker tallies.
///
/// Each slot has exactly one writer (its owning worker); the lock exists so
/// the final read observes every write, not to arbitrate slot ownership.
#[derive(Debug)]
pub struct ResultsBuffer {
    slots: Mutex<Vec<WorkerTally>>,
}

impl ResultsBuffer {
    /// Buffer with one zeroed slot per worker.
    pub fn new(n_workers: usize) -> Self {
        ResultsBuffer {
            slots: Mutex::new(vec![WorkerTally::default(); n_workers]),
        }
    }

    /// Record a worker's final tally in its slot.
    pub fn record(&self, worker: usize, tally: WorkerTally) {
        self.slots.lock()[worker] = tally;
    }

    /// Copy out all slots, taken under the same lock the writers used.
    pub fn snapshot(&self) -> Vec<WorkerTally> {
        self.slots.lock().clone()
    }
}

/// Run `config.n_workers` workers to exhaustion over `candidates` and
/// return the per-worker tallies.
///
/// Blocks until every worker has terminated. Per-test failures never
/// propagate out of the pool; a worker that cannot even create its working
/// directory reports a zero tally and the run continues on the others.
pub fn run_pool(config: &HarnessConfig, candidates: &[PathBuf]) -> Vec<WorkerTally> {
    let cursor = WorkCursor::new(candidates.len());
    let results = ResultsBuffer::new(config.n_workers);

    thread::scope(|scope| {
        for worker_id in 0..config.n_workers {
            let cursor = &cursor;
            let results = &results;
            scope.spawn(move || worker_loop(worker_id, config, candidates, cursor, results));
        }
    });

    results.snapshot()
}

fn worker_loop(
    worker_id: usize,
    config: &HarnessConfig,
    candidates: &[PathBuf],
    cursor: &WorkCursor,
    results: &ResultsBuffer,
) {
    let workdir = config.work_root.join(format!("worker_{worker_id}"));
    if let Err(e) = fs::create_dir_all(&workdir) {
        error!(worker = worker_id, dir = %workdir.display(), error = %e,
               "could not create worker directory; worker idle");
        results.record(worker_id, WorkerTally::default());
        return;
    }
    debug!(worker = worker_id, dir = %workdir.display(), "worker started");

    let total = candidates.len();
    let mut tally = WorkerTally::default();

    loop {
        let Some(index) = cursor.claim_next() else {
            results.record(worker_id, tally);
            return;
        };

        let outcome = run_isa_test(config, &workdir, &candidates[index]);
        tally.executed += 1;
        if outcome.passed {
            tally.passed += 1;
        }

        report_progress(worker_id, total, &tally, &outcome);
    }
}

/// One progress block per test: the pipeline's note block, a status line
/// with running totals, and a separator. Written as a single chunk so
/// concurrent workers do not interleave within a block.
fn report_progress(
    worker_id: usize,
    total: usize,
    tally: &WorkerTally,
    outcome: &crate::pipeline::TestOutcome,
) {
    let verdict = if outcome.passed { "PASS" } else { "FAIL" };
    let mut block = String::with_capacity(outcome.message.len() + 128);
    block.push_str(&outcome.message);
    block.push_str(&format!(
        "Worker {worker_id}: Test: {name} {verdict} [So far: total {total}, executed {executed}, PASS {passed}, FAIL {failed}]\n",
        name = outcome.test_name,
        executed = tally.executed,
        passed = tally.passed,
        failed = tally.executed - tally.passed,
    ));
    block.push_str("----------------------------------------------------------------\n");

    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(block.as_bytes());
    let _ = stdout.flush();
}
