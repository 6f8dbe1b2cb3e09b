use std::fmt;

use serde::{Deserialize, Serialize};

const PLACEHOLDER: &str = "N/A";

/// Identifier assigned to a task by the remote system.
///
/// The literal `"N/A"` marks a task that was never accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Id carried by a task before (or instead of) a successful submission.
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER.to_string())
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
