//! In-memory [`Transport`] for deterministic tests.
//!
//! Replies are scripted per `(method, path)`; once a script runs dry its last reply
//! keeps repeating. Every call is recorded with the (tokio) instant it was issued, so
//! paused-clock tests can assert on timing.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Method, header::HeaderMap};
use tokio::time::Instant;

use crate::{Transport, errors::TransportError, reply::Reply};

type Scripted = Result<Reply, TransportError>;

/// One request observed by a [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    /// Identity used for basic auth, if any.
    pub identity: Option<String>,
    pub at: Instant,
}

#[derive(Default)]
struct Route {
    pending: VecDeque<Scripted>,
    last: Option<Scripted>,
}

impl Route {
    fn next(&mut self) -> Option<Scripted> {
        match self.pending.pop_front() {
            Some(reply) => {
                self.last = Some(reply.clone());
                Some(reply)
            }
            None => self.last.clone(),
        }
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Duration,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency` (a suspension point, like real I/O).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Append replies for `method path`.
    pub fn script(&self, method: Method, path: &str, replies: impl IntoIterator<Item = Reply>) {
        let mut routes = lock(&self.routes);
        let route = routes.entry((method, path.to_string())).or_default();
        route.pending.extend(replies.into_iter().map(Ok));
    }

    /// Append a transport failure for `method path`.
    pub fn script_error(&self, method: Method, path: &str, err: TransportError) {
        let mut routes = lock(&self.routes);
        let route = routes.entry((method, path.to_string())).or_default();
        route.pending.push_back(Err(err));
    }

    pub fn on_get(&self, path: &str, replies: impl IntoIterator<Item = Reply>) {
        self.script(Method::GET, path, replies);
    }

    pub fn on_post(&self, path: &str, replies: impl IntoIterator<Item = Reply>) {
        self.script(Method::POST, path, replies);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .cloned()
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    async fn respond(&self, call: RecordedCall) -> Scripted {
        let key = (call.method.clone(), call.path.clone());
        lock(&self.calls).push(call);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        lock(&self.routes)
            .get_mut(&key)
            .and_then(Route::next)
            .unwrap_or_else(|| {
                Err(TransportError::Unscripted {
                    method: key.0.as_str().to_string(),
                    path: key.1,
                })
            })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Reply, TransportError> {
        self.respond(RecordedCall {
            method: Method::GET,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers,
            body: None,
            identity: None,
            at: Instant::now(),
        })
        .await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: HeaderMap,
    ) -> Result<Reply, TransportError> {
        self.respond(RecordedCall {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            headers,
            body: body.cloned(),
            identity: None,
            at: Instant::now(),
        })
        .await
    }

    async fn basic_auth_post(
        &self,
        path: &str,
        identity: &str,
        _secret: &str,
    ) -> Result<Reply, TransportError> {
        self.respond(RecordedCall {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            identity: Some(identity.to_string()),
            at: Instant::now(),
        })
        .await
    }
}
