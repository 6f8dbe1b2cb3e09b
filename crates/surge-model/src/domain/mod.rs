mod principal;
pub use principal::Principal;

mod credential;
pub use credential::Credential;

mod task_id;
pub use task_id::TaskId;

mod task;
pub use task::{Task, TaskState};

mod remote_status;
pub use remote_status::RemoteStatus;

mod workflow_result;
pub use workflow_result::{Outcome, WorkflowResult};

/// Work item content as submitted to and echoed back by the remote system.
///
/// Ordered so mismatch diagnostics print deterministically.
pub type Payload = std::collections::BTreeMap<String, String>;

/// Index of one execution inside a fan-out batch.
pub type ExecutionId = usize;
