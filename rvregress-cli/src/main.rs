//! rvregress binary entry point.
//!
//! Configuration and validation errors exit with code 1; a completed run
//! (including one that found zero relevant tests) exits with code 0.

use std::process::ExitCode;

fn main() -> ExitCode {
    match rvregress_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            eprintln!("Run with --help for usage.");
            ExitCode::FAILURE
        }
    }
}
