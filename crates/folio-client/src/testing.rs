//! In-memory transport for tests
//!
//! `ScriptedTransport` replays queued outcomes in order and records every request
//! it receives. Deferred outcomes let a test hold a response back and release it
//! later, which is how late-arriving responses are simulated.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::transport::{HttpRequest, RawFailure, RawResponse, Transport};

type Outcome = Result<RawResponse, RawFailure>;

enum Scripted {
    Ready(Outcome),
    Deferred(oneshot::Receiver<Outcome>),
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: Outcome) {
        lock(&self.script).push_back(Scripted::Ready(outcome));
    }

    /// Queue a 2xx (or any status) response with a JSON body
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push(Ok(json_response(status, &body)));
    }

    /// Queue a raw 2xx response body
    pub fn push_bytes(&self, status: u16, headers: Vec<(String, String)>, body: Vec<u8>) {
        self.push(Ok(RawResponse {
            status,
            headers,
            body,
        }));
    }

    /// Queue a non-2xx failure with a JSON body
    pub fn push_status(&self, status: u16, body: serde_json::Value) {
        self.push(Err(RawFailure::Status {
            status,
            body: serde_json::to_vec(&body).unwrap_or_default(),
        }));
    }

    pub fn push_no_response(&self, reason: &str) {
        self.push(Err(RawFailure::NoResponse {
            reason: reason.to_string(),
        }));
    }

    /// Queue an outcome that is only delivered when the returned sender fires
    pub fn push_deferred(&self) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        lock(&self.script).push_back(Scripted::Deferred(rx));
        tx
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }
}

/// Build a response whose body is `body` serialized as JSON
pub fn json_response(status: u16, body: &serde_json::Value) -> RawResponse {
    RawResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: serde_json::to_vec(body).unwrap_or_default(),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, RawFailure> {
        lock(&self.requests).push(request);
        let next = lock(&self.script).pop_front();
        match next {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Deferred(rx)) => rx.await.unwrap_or_else(|_| {
                Err(RawFailure::NoResponse {
                    reason: "deferred response dropped".to_string(),
                })
            }),
            None => Err(RawFailure::NoResponse {
                reason: "no scripted response".to_string(),
            }),
        }
    }
}
