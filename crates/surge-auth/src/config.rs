use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token exchange endpoint, relative to the transport base URL.
    pub token_path: String,
    /// Number of rate-limited responses tolerated before giving up.
    pub max_retries: u32,
    /// Wait applied when a `429` carries no usable `Retry-After`.
    pub default_retry_after: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_path: "/token".to_string(),
            max_retries: 2,
            default_retry_after: Duration::from_secs(60),
        }
    }
}
