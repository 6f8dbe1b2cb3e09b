use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use surge_client::TaskClient;
use surge_model::{Payload, Principal, Task, WorkflowResult};

use crate::{error::WorkflowError, poll::Poller};

const SAMPLE_ACTIONS: [&str; 10] = [
    "unlocked secret level",
    "discovered hidden feature",
    "earned achievement badge",
    "joined beta program",
    "shared on social media",
    "redeemed promo code",
    "completed tutorial",
    "customized avatar",
    "created playlist",
    "invited a friend",
];

/// Source of submission payloads.
#[derive(Debug, Clone, Default)]
pub enum PayloadCatalog {
    /// Uniform pick among the built-in `{user_id, action}` samples.
    #[default]
    Samples,
    /// Always submit the same payload.
    Fixed(Payload),
}

impl PayloadCatalog {
    pub fn pick(&self) -> Payload {
        match self {
            PayloadCatalog::Samples => {
                sample(SAMPLE_ACTIONS[rand::random_range(0..SAMPLE_ACTIONS.len())])
            }
            PayloadCatalog::Fixed(payload) => payload.clone(),
        }
    }
}

fn sample(action: &str) -> Payload {
    Payload::from([
        ("user_id".to_string(), "123".to_string()),
        ("action".to_string(), action.to_string()),
    ])
}

/// Submit one event and poll it to settlement.
#[derive(Clone)]
pub struct E2eWorkflow {
    client: Arc<TaskClient>,
    poller: Poller,
    principal: Principal,
    payloads: PayloadCatalog,
}

impl E2eWorkflow {
    pub fn new(client: Arc<TaskClient>, poller: Poller, principal: Principal) -> Self {
        Self {
            client,
            poller,
            principal,
            payloads: PayloadCatalog::default(),
        }
    }

    pub fn with_payloads(mut self, payloads: PayloadCatalog) -> Self {
        self.payloads = payloads;
        self
    }

    /// Run the workflow; never fails, errors are folded into the result.
    #[instrument(level = "debug", skip_all)]
    pub async fn execute(&self, cancel: &CancellationToken) -> WorkflowResult {
        let started = Instant::now();
        let mut task = Task::placeholder();

        match self.drive(&mut task, cancel).await {
            Ok(()) => {
                let elapsed = started.elapsed();
                info!(task_id = %task.id(), elapsed_ms = elapsed.as_millis() as u64, "workflow passed");
                WorkflowResult::passed(task.id().clone(), elapsed)
            }
            Err(e) => {
                let elapsed = started.elapsed();
                warn!(task_id = %task.id(), error = %e, "workflow failed");
                WorkflowResult::failed(task.id().clone(), e.to_string(), elapsed)
            }
        }
    }

    async fn drive(&self, task: &mut Task, cancel: &CancellationToken) -> Result<(), WorkflowError> {
        let payload = self.payloads.pick();
        *task = self.client.submit(&payload, &self.principal).await?;
        self.poller.await_settled(task, &self.principal, cancel).await?;
        Ok(())
    }
}
