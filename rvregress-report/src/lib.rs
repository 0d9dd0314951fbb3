#![warn(missing_docs)]
//! rvregress Report - Aggregation and Output
//!
//! Turns the per-worker tallies of a run into:
//! - the final aggregate summary (total / executed / PASS / FAIL)
//! - human-readable terminal output
//! - a machine-readable JSON report

mod human;
mod json;
mod report;

pub use human::format_summary;
pub use json::generate_json_report;
pub use report::{aggregate, Report, ReportMeta, RunSummary};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Machine-readable JSON.
    Json,
    /// Human-readable terminal output.
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
