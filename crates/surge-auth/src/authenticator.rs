use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use surge_model::{Credential, Principal};
use surge_transport::{StatusCode, Transport, header::HeaderMap};

use crate::{config::AuthConfig, error::AuthError};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Parse an integer-seconds `Retry-After` header.
///
/// Returns `None` when the header is missing or not a whole number of seconds.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get("retry-after")?.to_str().ok()?;
    raw.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Basic-auth token exchange with a bounded rate-limit retry loop.
///
/// The backoff sleep happens inside the caller's critical section: when invoked by
/// [`crate::TokenCache`] every stampeding caller waits on that one sleep.
pub struct Authenticator {
    transport: Arc<dyn Transport>,
    cfg: AuthConfig,
    shutdown: CancellationToken,
}

impl Authenticator {
    pub fn new(transport: Arc<dyn Transport>, cfg: AuthConfig) -> Self {
        Self {
            transport,
            cfg,
            shutdown: CancellationToken::new(),
        }
    }

    /// Abort rate-limit waits once `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    #[inline]
    pub fn config(&self) -> &AuthConfig {
        &self.cfg
    }

    #[instrument(level = "debug", skip(self, principal), fields(identity = principal.identity()))]
    pub async fn authenticate(&self, principal: &Principal) -> Result<Credential, AuthError> {
        let mut rate_limited: u32 = 0;

        loop {
            let reply = self
                .transport
                .basic_auth_post(&self.cfg.token_path, principal.identity(), principal.secret())
                .await?;

            match reply.status {
                StatusCode::OK => {
                    let body: TokenResponse = reply
                        .json()
                        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
                    debug!(expires_in = body.expires_in, "token issued");
                    return Ok(Credential::new(
                        body.access_token,
                        body.expires_in,
                        Instant::now(),
                    ));
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    rate_limited += 1;
                    if rate_limited >= self.cfg.max_retries {
                        warn!(
                            attempts = rate_limited,
                            max_retries = self.cfg.max_retries,
                            "token endpoint kept rate limiting; giving up"
                        );
                        return Err(AuthError::Exhausted {
                            max_retries: self.cfg.max_retries,
                        });
                    }

                    let wait = parse_retry_after(&reply.headers).unwrap_or(self.cfg.default_retry_after);
                    warn!(
                        attempt = rate_limited,
                        wait_secs = wait.as_secs(),
                        "token request rate limited; waiting before retry"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = self.shutdown.cancelled() => return Err(AuthError::Cancelled),
                    }
                }
                status => {
                    warn!(status = status.as_u16(), "token request rejected");
                    return Err(AuthError::Failed {
                        status: status.as_u16(),
                        body: reply.body,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use surge_transport::{
        Method, Reply, TransportError,
        header::HeaderValue,
        testing::ScriptedTransport,
    };

    fn issued(token: &str, expires_in: u64) -> Reply {
        Reply::new(StatusCode::OK).with_json(&json!({ "access_token": token, "expires_in": expires_in }))
    }

    fn rate_limited(retry_after: Option<&str>) -> Reply {
        let reply = Reply::new(StatusCode::TOO_MANY_REQUESTS);
        match retry_after {
            Some(v) => reply.with_header("retry-after", v),
            None => reply,
        }
    }

    fn setup(cfg: AuthConfig) -> (Arc<ScriptedTransport>, Authenticator) {
        let transport = Arc::new(ScriptedTransport::new());
        let auth = Authenticator::new(transport.clone(), cfg);
        (transport, auth)
    }

    fn principal() -> Principal {
        Principal::new("test", "test")
    }

    #[test]
    fn parses_integer_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static(" 5 "));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(5)));

        headers.insert("retry-after", HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers), None);

        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn success_builds_credential() {
        let (transport, auth) = setup(AuthConfig::default());
        transport.on_post("/token", [issued("tok-1", 300)]);

        let cred = auth.authenticate(&principal()).await.unwrap();
        assert_eq!(cred.access_token(), "tok-1");
        assert_eq!(cred.expiry(), Duration::from_secs(300));
        assert!(cred.is_fresh());

        let calls = transport.calls_to(Method::POST, "/token");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].identity.as_deref(), Some("test"));
    }

    #[tokio::test(start_paused = true)]
    async fn honours_retry_after_before_retrying() {
        let (transport, auth) = setup(AuthConfig::default());
        transport.on_post("/token", [rate_limited(Some("5")), issued("tok-1", 300)]);

        let cred = auth.authenticate(&principal()).await.unwrap();
        assert_eq!(cred.access_token(), "tok-1");

        let calls = transport.calls_to(Method::POST, "/token");
        assert_eq!(calls.len(), 2);
        assert!(calls[1].at.duration_since(calls[0].at) >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_retry_after_uses_default_wait() {
        let (transport, auth) = setup(AuthConfig::default());
        transport.on_post("/token", [rate_limited(None), issued("tok-1", 300)]);

        auth.authenticate(&principal()).await.unwrap();

        let calls = transport.calls_to(Method::POST, "/token");
        assert!(calls[1].at.duration_since(calls[0].at) >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_rate_limited_responses() {
        let (transport, auth) = setup(AuthConfig::default());
        transport.on_post("/token", [rate_limited(Some("1"))]);

        let err = auth.authenticate(&principal()).await.unwrap_err();
        assert_eq!(err, AuthError::Exhausted { max_retries: 2 });
        assert_eq!(transport.count(Method::POST, "/token"), 2);
        assert!(err.to_string().contains("maximum authentication retries 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_ceiling_is_configurable() {
        let (transport, auth) = setup(AuthConfig {
            max_retries: 4,
            ..AuthConfig::default()
        });
        transport.on_post("/token", [rate_limited(Some("1"))]);

        let err = auth.authenticate(&principal()).await.unwrap_err();
        assert_eq!(err, AuthError::Exhausted { max_retries: 4 });
        assert_eq!(transport.count(Method::POST, "/token"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn other_status_fails_without_retry() {
        let (transport, auth) = setup(AuthConfig::default());
        transport.on_post(
            "/token",
            [Reply::new(StatusCode::UNAUTHORIZED).with_body("bad credentials")],
        );

        let err = auth.authenticate(&principal()).await.unwrap_err();
        assert_eq!(
            err,
            AuthError::Failed {
                status: 401,
                body: "bad credentials".to_string()
            }
        );
        assert_eq!(transport.count(Method::POST, "/token"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_token_body_is_rejected() {
        let (transport, auth) = setup(AuthConfig::default());
        transport.on_post("/token", [Reply::new(StatusCode::OK).with_body("{}")]);

        let err = auth.authenticate(&principal()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_surfaces() {
        let (transport, auth) = setup(AuthConfig::default());
        transport.script_error(
            Method::POST,
            "/token",
            TransportError::Request("connection refused".to_string()),
        );

        let err = auth.authenticate(&principal()).await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(TransportError::Request(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_backoff() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on_post("/token", [rate_limited(Some("30"))]);

        let shutdown = CancellationToken::new();
        let auth = Authenticator::new(transport.clone(), AuthConfig::default())
            .with_shutdown(shutdown.clone());
        shutdown.cancel();

        let err = auth.authenticate(&principal()).await.unwrap_err();
        assert_eq!(err, AuthError::Cancelled);
        assert_eq!(transport.count(Method::POST, "/token"), 1);
    }
}
