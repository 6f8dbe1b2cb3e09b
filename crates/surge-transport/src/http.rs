use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, Url, header::HeaderMap};
use tracing::{debug, instrument};

use crate::{Transport, config::TransportConfig, errors::TransportError, reply::Reply};

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(cfg: &TransportConfig) -> Result<Self, TransportError> {
        Url::parse(&cfg.base_url).map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", cfg.base_url)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, TransportError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

async fn buffer(response: Response) -> Result<Reply, TransportError> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    debug!(status = %status, bytes = body.len(), "response received");
    Ok(Reply {
        status,
        headers,
        body,
    })
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "trace", skip(self, query, headers))]
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Reply, TransportError> {
        let response = self
            .client
            .get(self.url(path, query)?)
            .headers(headers)
            .send()
            .await?;
        buffer(response).await
    }

    #[instrument(level = "trace", skip(self, body, headers))]
    async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: HeaderMap,
    ) -> Result<Reply, TransportError> {
        let mut request = self.client.post(self.url(path, &[])?).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }
        buffer(request.send().await?).await
    }

    #[instrument(level = "trace", skip(self, secret))]
    async fn basic_auth_post(
        &self,
        path: &str,
        identity: &str,
        secret: &str,
    ) -> Result<Reply, TransportError> {
        let response = self
            .client
            .post(self.url(path, &[])?)
            .basic_auth(identity, Some(secret))
            .send()
            .await?;
        buffer(response).await
    }
}
