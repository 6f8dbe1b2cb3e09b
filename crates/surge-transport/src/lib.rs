//! Transport adapter between surge and the remote task API.
//!
//! The adapter only moves bytes: it never interprets status codes. Callers decide
//! what a `202` or a `429` means.

mod config;
pub use config::TransportConfig;

mod errors;
pub use errors::TransportError;

mod reply;
pub use reply::Reply;

mod http;
pub use http::HttpTransport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use reqwest::{Method, StatusCode, header};

use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// Request/response client for a fixed base URL.
///
/// Shared read-only across every concurrent execution.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Reply, TransportError>;

    async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: HeaderMap,
    ) -> Result<Reply, TransportError>;

    /// POST with HTTP basic authentication and no body.
    async fn basic_auth_post(
        &self,
        path: &str,
        identity: &str,
        secret: &str,
    ) -> Result<Reply, TransportError>;
}
