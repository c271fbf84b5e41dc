//! Bounded retry with exponential backoff
//!
//! Only failures classified as `NetworkError` or `ServerError` are retried. The
//! delay before retry `n` (0-based) is exactly `base_delay * 2^n`: no jitter and
//! no cap, so callers bound the worst case through `max_retries`.

use folio_api::ApiError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::transport::{HttpRequest, RawResponse, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; total calls never exceed `max_retries + 1`
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry `retry` (0 for the first retry): `base_delay * 2^retry`,
    /// clamped to `Duration::MAX`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let base = self.base_delay.as_nanos();
        if base == 0 {
            return Duration::ZERO;
        }
        let nanos = 1u128
            .checked_shl(retry)
            .map_or(u128::MAX, |factor| base.saturating_mul(factor));
        let secs = nanos / 1_000_000_000;
        match u64::try_from(secs) {
            Ok(secs) => Duration::new(secs, (nanos % 1_000_000_000) as u32),
            Err(_) => Duration::MAX,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Run `request_fn` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent.
///
/// Every attempt calls `request_fn` again, so each retry is a fresh request.
pub async fn execute<T, F, Fut>(policy: RetryPolicy, mut request_fn: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retries = 0;
    loop {
        match request_fn().await {
            Ok(value) => {
                if retries > 0 {
                    debug!("[Executor] Succeeded after {} retries", retries);
                }
                return Ok(value);
            }
            Err(error) if error.is_retryable() && retries < policy.max_retries => {
                let delay = policy.delay_for_retry(retries);
                warn!(
                    "[Executor] Attempt {}/{} failed ({}), retrying in {}ms",
                    retries + 1,
                    policy.max_retries + 1,
                    error,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Sends requests through a [`Transport`], normalizing failures.
///
/// GET and DELETE go through [`execute`]; POST, PUT and PATCH are sent exactly once.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// One transport call, failures normalized
    pub async fn send_once(&self, request: HttpRequest) -> Result<RawResponse, ApiError> {
        self.transport
            .send(request)
            .await
            .map_err(|failure| normalize(&failure))
    }

    /// Retry-aware send; mutating verbs other than DELETE are never replayed
    pub async fn send(&self, request: HttpRequest) -> Result<RawResponse, ApiError> {
        if !request.method.is_idempotent() {
            return self.send_once(request).await;
        }
        execute(self.policy, || self.send_once(request.clone())).await
    }
}
