//! Format-agnostic batch report.
//!
//! Rendering (console tables, HTML, ...) belongs to whoever consumes [`Report`].

mod row;
pub use row::{ReportRow, RowStatus};

use std::time::Duration;

use serde::Serialize;

use crate::{ExecutionId, WorkflowResult};

/// Aggregated outcome of a fan-out batch.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// One row per execution, ordered by execution id.
    pub rows: Vec<ReportRow>,
    pub passed: usize,
    pub failed: usize,
    /// Wall-clock duration of the whole batch.
    pub duration: Duration,
}

impl Report {
    pub fn new(mut results: Vec<(ExecutionId, WorkflowResult)>, duration: Duration) -> Self {
        results.sort_by_key(|(id, _)| *id);

        let rows: Vec<ReportRow> = results
            .into_iter()
            .map(|(id, result)| ReportRow::new(id, result))
            .collect();
        let passed = rows
            .iter()
            .filter(|r| r.status == RowStatus::Passed)
            .count();
        let failed = rows.len() - passed;

        Self {
            rows,
            passed,
            failed,
            duration,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` only if every execution passed.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable failure lines, one per failed execution.
    pub fn failures(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.status == RowStatus::Failed)
            .map(|r| format!("{}: {}", r.execution_id, r.reason))
            .collect()
    }

    /// Percentage of passed executions; `0.0` for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.passed as f64 / self.rows.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskId;

    fn results() -> Vec<(ExecutionId, WorkflowResult)> {
        vec![
            (
                2,
                WorkflowResult::failed(TaskId::placeholder(), "auth", Duration::from_secs(1)),
            ),
            (
                0,
                WorkflowResult::passed(TaskId::from("a"), Duration::from_secs(30)),
            ),
            (
                1,
                WorkflowResult::passed(TaskId::from("b"), Duration::from_secs(40)),
            ),
        ]
    }

    #[test]
    fn tallies_and_orders_rows() {
        let report = Report::new(results(), Duration::from_secs(41));

        assert_eq!(report.total(), 3);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.is_success());
        assert_eq!(report.duration, Duration::from_secs(41));

        let ids: Vec<_> = report.rows.iter().map(|r| r.execution_id.as_str()).collect();
        assert_eq!(ids, vec!["exec-0", "exec-1", "exec-2"]);
        assert_eq!(report.failures(), vec!["exec-2: auth".to_string()]);
    }

    #[test]
    fn all_passed_is_success() {
        let report = Report::new(
            vec![(0, WorkflowResult::passed(TaskId::from("a"), Duration::ZERO))],
            Duration::ZERO,
        );
        assert!(report.is_success());
        assert!(report.failures().is_empty());
        assert_eq!(report.success_rate(), 100.0);
    }

    #[test]
    fn empty_batch() {
        let report = Report::new(Vec::new(), Duration::ZERO);
        assert!(report.is_success());
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn serializes_rows() {
        let report = Report::new(results(), Duration::from_secs(41));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["passed"], 2);
        assert_eq!(json["rows"][2]["status"], "FAILED");
        assert_eq!(json["rows"][2]["taskId"], "N/A");
    }
}
