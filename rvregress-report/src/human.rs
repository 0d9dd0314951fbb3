//! Human-readable summary output.

use crate::report::Report;

/// Format the end-of-run summary for terminal display: one line per worker
/// followed by the aggregate counts.
pub fn format_summary(report: &Report) -> String {
    let mut output = String::new();

    for (worker, tally) in report.worker_tallies.iter().enumerate() {
        output.push_str(&format!(
            "Worker {worker} executed {executed} tests, of which {passed} passed\n",
            executed = tally.executed,
            passed = tally.passed,
        ));
    }

    let summary = &report.summary;
    output.push_str(&format!("Total tests: {} tests\n", summary.total));
    output.push_str(&format!("Executed:    {} tests\n", summary.executed));
    output.push_str(&format!("PASS:        {} tests\n", summary.passed));
    output.push_str(&format!("FAIL:        {} tests\n", summary.failed));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{aggregate, ReportMeta};
    use rvregress_core::WorkerTally;

    fn sample_report() -> Report {
        let tallies = vec![
            WorkerTally { executed: 2, passed: 2 },
            WorkerTally { executed: 3, passed: 1 },
        ];
        Report {
            meta: ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: chrono::Utc::now(),
                arch: "RV64IMAFD".to_string(),
                families: vec!["rv64ui-p".to_string()],
                workers: 2,
            },
            summary: aggregate(5, &tallies),
            worker_tallies: tallies,
        }
    }

    #[test]
    fn summary_lists_workers_and_totals() {
        let output = format_summary(&sample_report());

        assert!(output.contains("Worker 0 executed 2 tests, of which 2 passed"));
        assert!(output.contains("Worker 1 executed 3 tests, of which 1 passed"));
        assert!(output.contains("Total tests: 5 tests"));
        assert!(output.contains("Executed:    5 tests"));
        assert!(output.contains("PASS:        3 tests"));
        assert!(output.contains("FAIL:        2 tests"));
    }
}
