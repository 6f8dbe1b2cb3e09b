use std::{
    any::Any,
    fmt::Display,
    future::Future,
    sync::{Arc, OnceLock},
    time::Duration,
};

use tokio::{task::JoinError, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use surge_model::{ExecutionId, Report, TaskId, WorkflowResult};

/// Handle passed to each execution of a batch.
#[derive(Debug, Clone)]
pub struct Execution {
    pub id: ExecutionId,
    /// Child of the runner's token; cancelled together with the batch.
    pub cancel: CancellationToken,
}

/// Records how long its execution ran when dropped, which also happens while a
/// panicking task unwinds.
struct Stopwatch {
    started: Instant,
    finished: Arc<OnceLock<Duration>>,
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        let _ = self.finished.set(self.started.elapsed());
    }
}

/// Launches a batch of independent executions concurrently and aggregates them.
pub struct FanoutRunner {
    cancel: CancellationToken,
}

impl FanoutRunner {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Spawn `count` executions built by `factory` and wait for all of them.
    ///
    /// An execution that returns `Err` or panics is recorded as failed with a
    /// placeholder task id; its siblings keep running.
    #[instrument(level = "info", skip(self, factory))]
    pub async fn run<F, Fut, E>(&self, factory: F, count: usize) -> Report
    where
        F: Fn(Execution) -> Fut,
        Fut: Future<Output = Result<WorkflowResult, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let started = Instant::now();

        let handles: Vec<_> = (0..count)
            .map(|id| {
                let exec = Execution {
                    id,
                    cancel: self.cancel.child_token(),
                };
                let finished = Arc::new(OnceLock::new());
                let watch = Stopwatch {
                    started: Instant::now(),
                    finished: Arc::clone(&finished),
                };
                let fut = factory(exec);
                let handle = tokio::spawn(async move {
                    let _watch = watch;
                    fut.await
                });
                (id, finished, handle)
            })
            .collect();
        debug!(count, "batch launched");

        let mut results = Vec::with_capacity(count);
        for (id, finished, handle) in handles {
            let outcome = handle.await;
            let elapsed = finished.get().copied().unwrap_or_else(|| started.elapsed());
            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    error!(execution = id, error = %e, "execution failed");
                    WorkflowResult::failed(TaskId::placeholder(), e.to_string(), elapsed)
                }
                Err(join) => {
                    let reason = describe_join_error(join);
                    error!(execution = id, %reason, "execution aborted");
                    WorkflowResult::failed(TaskId::placeholder(), reason, elapsed)
                }
            };
            results.push((id, result));
        }

        let report = Report::new(results, started.elapsed());
        info!(
            total = report.total(),
            passed = report.passed,
            failed = report.failed,
            duration_ms = report.duration.as_millis() as u64,
            "batch finished"
        );
        report
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        format!("execution panicked: {}", panic_message(err.into_panic()))
    } else {
        "execution was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}
