#![warn(missing_docs)]
//! rvregress Core - Regression Engine
//!
//! This crate provides the test-selection and execution engine of the
//! harness:
//! - Architecture descriptor decoding (`RV32`/`RV64` marker + extensions)
//! - Test-family selection for a decoded architecture
//! - Candidate discovery over the tests directory
//! - The shared work cursor that distributes candidate indices
//! - The per-test conversion-and-execution pipeline
//! - The worker pool and shared results buffer
//!
//! The CLI crate layers configuration loading and validation on top; the
//! report crate turns the per-worker tallies into summaries.

mod arch;
mod config;
mod cursor;
mod discovery;
mod families;
mod pipeline;
mod worker;

pub use arch::{ArchError, ArchSpec, BaseWidth};
pub use config::{HarnessConfig, MemoryGeometry, Verbosity};
pub use cursor::WorkCursor;
pub use discovery::{discover_tests, DiscoveryError, Selection};
pub use families::select_families;
pub use pipeline::{run_isa_test, TestOutcome};
pub use worker::{run_pool, ResultsBuffer, WorkerTally};
