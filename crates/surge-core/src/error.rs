use std::time::Duration;

use surge_client::ClientError;
use surge_model::{Payload, TaskId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("data mismatch for task {task_id} between request {expected:?} and response {observed:?}")]
    DataMismatch {
        task_id: TaskId,
        expected: Payload,
        observed: Option<Payload>,
    },

    #[error("polling timeout after {:.2}s - event still pending", elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },

    #[error("task {0} was never submitted")]
    NotSubmitted(TaskId),

    #[error("polling cancelled")]
    Cancelled,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Any failure of an end-to-end execution.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Poll(#[from] PollError),
}
