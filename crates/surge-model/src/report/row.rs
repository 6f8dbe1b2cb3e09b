use std::{fmt, time::Duration};

use serde::Serialize;

use crate::{ExecutionId, Outcome, TaskId, WorkflowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowStatus {
    Passed,
    Failed,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Passed => f.write_str("PASSED"),
            RowStatus::Failed => f.write_str("FAILED"),
        }
    }
}

/// One line of the batch report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub execution_id: String,
    pub task_id: TaskId,
    pub status: RowStatus,
    pub elapsed: Duration,
    /// Empty for passed executions.
    pub reason: String,
}

impl ReportRow {
    pub fn new(id: ExecutionId, result: WorkflowResult) -> Self {
        let (status, reason) = match result.outcome {
            Outcome::Passed => (RowStatus::Passed, String::new()),
            Outcome::Failed(reason) => (RowStatus::Failed, reason),
        };
        Self {
            execution_id: format!("exec-{id}"),
            task_id: result.task_id,
            status,
            elapsed: result.elapsed,
            reason,
        }
    }
}
