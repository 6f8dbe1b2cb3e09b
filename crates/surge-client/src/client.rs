use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use surge_auth::TokenCache;
use surge_model::{Payload, Principal, RemoteStatus, Task, TaskId};
use surge_transport::{
    StatusCode, Transport,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::error::ClientError;

const HEALTH_PATH: &str = "/health";
const EVENT_PATH: &str = "/event";

/// Thin facade over the remote task API.
///
/// Every authenticated call goes through the shared [`TokenCache`]. No retries
/// happen here: failures surface to the caller.
#[derive(Clone)]
pub struct TaskClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenCache>,
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct EventRequest<'a> {
    data: &'a Payload,
}

#[derive(Debug, Deserialize)]
struct EventAccepted {
    task_id: String,
}

/// Raw status as reported by `GET /status/{task_id}`; interpretation is left to the poller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusReport {
    pub status: RemoteStatus,
    /// Payload echoed by the remote system; absent if the server omitted it.
    #[serde(default)]
    pub data: Option<Payload>,
}

// ============================================================================
// Client
// ============================================================================

impl TaskClient {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<TokenCache>) -> Self {
        Self { transport, tokens }
    }

    /// `GET /health`; `true` iff the service answered 200.
    pub async fn check_health(&self) -> Result<bool, ClientError> {
        let reply = self.transport.get(HEALTH_PATH, &[], HeaderMap::new()).await?;
        debug!(status = reply.status.as_u16(), "health probe");
        Ok(reply.status == StatusCode::OK)
    }

    /// Submit `payload` and return the accepted, pending task.
    #[instrument(level = "debug", skip_all, fields(identity = principal.identity()))]
    pub async fn submit(&self, payload: &Payload, principal: &Principal) -> Result<Task, ClientError> {
        let headers = self.bearer(principal).await?;
        let body = serde_json::to_value(EventRequest { data: payload })
            .map_err(|e| ClientError::InvalidResponse(format!("failed to encode event: {e}")))?;

        let reply = self.transport.post(EVENT_PATH, Some(&body), headers).await?;
        if reply.status != StatusCode::ACCEPTED {
            return Err(ClientError::SubmissionFailed {
                status: reply.status.as_u16(),
                detail: reply.body,
            });
        }

        let accepted: EventAccepted = reply
            .json()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        debug!(task_id = %accepted.task_id, "event accepted");

        Ok(Task::accepted(TaskId::from(accepted.task_id), payload.clone()))
    }

    /// Look up the remote status of `task_id`.
    #[instrument(level = "trace", skip_all, fields(task_id = %task_id))]
    pub async fn query_status(
        &self,
        task_id: &TaskId,
        principal: &Principal,
    ) -> Result<StatusReport, ClientError> {
        let headers = self.bearer(principal).await?;
        let path = format!("/status/{task_id}");

        let reply = self.transport.get(&path, &[], headers).await?;
        if !reply.status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                path,
                status: reply.status.as_u16(),
                body: reply.body,
            });
        }

        reply
            .json()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn bearer(&self, principal: &Principal) -> Result<HeaderMap, ClientError> {
        let token = self.tokens.get_current_token(principal).await?;
        let mut value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ClientError::InvalidToken)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}
