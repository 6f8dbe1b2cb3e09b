use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::TaskId;

/// Terminal verdict of one workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum Outcome {
    Passed,
    Failed(String),
}

impl Outcome {
    #[inline]
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// Failure description, empty for a pass.
    pub fn reason(&self) -> &str {
        match self {
            Outcome::Passed => "",
            Outcome::Failed(reason) => reason,
        }
    }
}

/// Result of a single fan-out execution. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub task_id: TaskId,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl WorkflowResult {
    pub fn passed(task_id: TaskId, elapsed: Duration) -> Self {
        Self {
            task_id,
            outcome: Outcome::Passed,
            elapsed,
        }
    }

    pub fn failed(task_id: TaskId, reason: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            task_id,
            outcome: Outcome::Failed(reason.into()),
            elapsed,
        }
    }
}
