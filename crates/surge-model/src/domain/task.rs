use serde::{Deserialize, Serialize};

use crate::{ModelError, Payload, TaskId};

/// Local view of a submitted work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskState {
    /// Accepted by the remote system, not yet observed as settled.
    Pending,
    /// Remote system reported the task settled.
    Settled,
}

impl TaskState {
    /// Returns `true` if the state cannot transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Settled)
    }
}

/// A work item together with the payload the client submitted.
///
/// The payload is client-authoritative: it is never re-read from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    payload: Payload,
    state: TaskState,
}

impl Task {
    /// Create a freshly accepted task.
    pub fn accepted(id: TaskId, payload: Payload) -> Self {
        Self {
            id,
            payload,
            state: TaskState::Pending,
        }
    }

    /// Pre-submission stand-in, used for reporting when submission never succeeds.
    pub fn placeholder() -> Self {
        Self {
            id: TaskId::placeholder(),
            payload: Payload::new(),
            state: TaskState::Pending,
        }
    }

    #[inline]
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[inline]
    pub fn is_submitted(&self) -> bool {
        !self.id.is_placeholder()
    }

    /// Pending -> Settled. Idempotent for an already settled task.
    ///
    /// A placeholder can never settle.
    pub fn settle(&mut self) -> Result<(), ModelError> {
        if !self.is_submitted() {
            return Err(ModelError::NotSubmitted(self.id.to_string()));
        }
        self.state = TaskState::Settled;
        Ok(())
    }
}
