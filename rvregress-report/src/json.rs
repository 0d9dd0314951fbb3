//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
///
/// Serializes the run report into machine-readable JSON.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{aggregate, ReportMeta};
    use rvregress_core::WorkerTally;

    #[test]
    fn json_report_carries_counts_and_meta() {
        let tallies = vec![WorkerTally { executed: 1, passed: 1 }];
        let report = Report {
            meta: ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: chrono::Utc::now(),
                arch: "RV32IMU".to_string(),
                families: vec!["rv32ui-p".to_string(), "rv32mi-p".to_string()],
                workers: 1,
            },
            summary: aggregate(1, &tallies),
            worker_tallies: tallies,
        };

        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"arch\": \"RV32IMU\""));
        assert!(json.contains("\"executed\": 1"));
        assert!(json.contains("rv32mi-p"));
    }
}
