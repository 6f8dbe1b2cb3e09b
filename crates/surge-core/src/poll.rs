use std::{sync::Arc, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use surge_client::TaskClient;
use surge_model::{Principal, RemoteStatus, Task};

use crate::error::PollError;

/// Poll schedule: a growing delay between status queries within a total budget.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// First sleep, before the first query.
    pub initial_delay: Duration,
    /// Upper bound for a single sleep.
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// Total polling budget, measured from the first sleep.
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(25),
            max_delay: Duration::from_secs(60),
            backoff_factor: 1.5,
            deadline: Duration::from_secs(190),
        }
    }
}

impl PollConfig {
    fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Drives a pending [`Task`] to `Settled`, or fails trying.
#[derive(Clone)]
pub struct Poller {
    client: Arc<TaskClient>,
    cfg: PollConfig,
}

impl Poller {
    pub fn new(client: Arc<TaskClient>, cfg: PollConfig) -> Self {
        Self { client, cfg }
    }

    #[inline]
    pub fn config(&self) -> &PollConfig {
        &self.cfg
    }

    /// Poll until the remote system reports `task` settled.
    ///
    /// Every status response must echo the submitted payload; the first divergence
    /// fails immediately. Returns the number of status queries issued.
    #[instrument(level = "debug", skip_all, fields(task_id = %task.id()))]
    pub async fn await_settled(
        &self,
        task: &mut Task,
        principal: &Principal,
        cancel: &CancellationToken,
    ) -> Result<u32, PollError> {
        if !task.is_submitted() {
            return Err(PollError::NotSubmitted(task.id().clone()));
        }

        let started = Instant::now();
        let mut delay = self.cfg.initial_delay;
        let mut queries: u32 = 0;

        loop {
            let elapsed = started.elapsed();
            let Some(remaining) = self.cfg.deadline.checked_sub(elapsed).filter(|r| !r.is_zero()) else {
                return Err(PollError::Timeout { elapsed });
            };

            tokio::select! {
                _ = tokio::time::sleep(delay.min(remaining)) => {}
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
            }

            let elapsed = started.elapsed();
            if elapsed >= self.cfg.deadline {
                return Err(PollError::Timeout { elapsed });
            }

            let report = self.client.query_status(task.id(), principal).await?;
            queries += 1;

            if report.data.as_ref() != Some(task.payload()) {
                warn!(queries, "status response does not echo the submitted payload");
                return Err(PollError::DataMismatch {
                    task_id: task.id().clone(),
                    expected: task.payload().clone(),
                    observed: report.data,
                });
            }

            delay = self.cfg.next_delay(delay);

            match report.status {
                RemoteStatus::Settled => {
                    task.settle()
                        .map_err(|_| PollError::NotSubmitted(task.id().clone()))?;
                    debug!(queries, elapsed_ms = started.elapsed().as_millis() as u64, "task settled");
                    return Ok(queries);
                }
                RemoteStatus::Pending => {
                    debug!(queries, delay_ms = delay.as_millis() as u64, "task still pending");
                }
                RemoteStatus::Unrecognized(raw) => {
                    warn!(queries, status = %raw, delay_ms = delay.as_millis() as u64, "unrecognized task status; continuing to poll");
                }
            }
        }
    }
}
