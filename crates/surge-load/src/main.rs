mod config;
mod report;

use std::{convert::Infallible, process::ExitCode, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use surge_auth::{Authenticator, TokenCache};
use surge_client::TaskClient;
use surge_core::{E2eWorkflow, Execution, FanoutRunner, Poller};
use surge_observe::logger_init;
use surge_transport::HttpTransport;

use crate::config::LoadConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 1) Config + logger
    let cfg = LoadConfig::from_env()?;
    logger_init(&cfg.logger)?;
    info!(
        base_url = %cfg.transport.base_url,
        fanout = cfg.fanout,
        identity = cfg.principal.identity(),
        "configuration loaded"
    );

    // 2) Shutdown
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; cancelling batch");
                shutdown.cancel();
            }
        });
    }

    // 3) Client stack
    let transport = Arc::new(HttpTransport::new(&cfg.transport)?);
    let authenticator = Authenticator::new(transport.clone(), cfg.auth.clone()).with_shutdown(shutdown.clone());
    let tokens = Arc::new(TokenCache::new(authenticator));
    let client = Arc::new(TaskClient::new(transport, tokens));
    let poller = Poller::new(client.clone(), cfg.poll.clone());

    match client.check_health().await {
        Ok(true) => info!("service healthy"),
        Ok(false) => warn!("health check did not return 200; running anyway"),
        Err(e) => warn!(error = %e, "health check failed; running anyway"),
    }

    // 4) Batch
    let workflow = E2eWorkflow::new(client, poller, cfg.principal.clone());
    let runner = FanoutRunner::new(shutdown);
    let report = runner
        .run(
            |exec: Execution| {
                let workflow = workflow.clone();
                async move { Ok::<_, Infallible>(workflow.execute(&exec.cancel).await) }
            },
            cfg.fanout,
        )
        .await;

    // 5) Report
    println!("{}", report::render(&report));
    if report.is_success() {
        return Ok(ExitCode::SUCCESS);
    }
    for failure in report.failures() {
        eprintln!("{failure}");
    }
    Ok(ExitCode::FAILURE)
}
