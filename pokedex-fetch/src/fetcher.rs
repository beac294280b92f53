//! Concurrency-capped GET with retry.
//!
//! A permit is held only while a request is on the wire. Backoff sleeps run
//! without one, so a rate-limited URL does not starve the others.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::backoff::{BackoffPolicy, RetryKind, parse_retry_after};
use crate::error::FetchError;
use crate::transport::Transport;

const TOO_MANY_REQUESTS: u16 = 429;

pub struct Fetcher<T> {
    transport: T,
    permits: Arc<Semaphore>,
    limit: usize,
    policy: BackoffPolicy,
}

impl<T: Transport> Fetcher<T> {
    /// `concurrency` of zero is treated as one.
    pub fn new(transport: T, concurrency: usize, policy: BackoffPolicy) -> Self {
        let limit = concurrency.max(1);
        Self {
            transport,
            permits: Arc::new(Semaphore::new(limit)),
            limit,
            policy,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `url` and return the body of the first 2xx response.
    ///
    /// 429 and network failures are retried up to the policy limit. Any other
    /// non-success status is returned immediately.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut attempt = 0u32;
        loop {
            let result = {
                let _permit = self.permits.acquire().await.map_err(|_| FetchError::Closed)?;
                self.transport.get(url).await
            };

            let wait = match result {
                Ok(resp) if resp.is_success() => return Ok(resp.body),
                Ok(resp) if resp.status == TOO_MANY_REQUESTS => {
                    if self.policy.is_last(attempt) {
                        return Err(FetchError::RateLimited {
                            url: url.to_string(),
                            attempts: attempt + 1,
                        });
                    }
                    let hint = resp.retry_after.as_deref().and_then(parse_retry_after);
                    let wait = self.policy.delay(attempt, RetryKind::RateLimited, hint);
                    log::warn!(
                        "429 from {} (attempt {}), retrying in {}ms",
                        url,
                        attempt + 1,
                        wait.as_millis()
                    );
                    wait
                }
                Ok(resp) => {
                    return Err(FetchError::Status {
                        status: resp.status,
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    if self.policy.is_last(attempt) {
                        return Err(FetchError::Transient {
                            url: url.to_string(),
                            attempts: attempt + 1,
                            source: e,
                        });
                    }
                    let wait = self.policy.delay(attempt, RetryKind::Network, None);
                    log::warn!(
                        "{} fetching {} (attempt {}), retrying in {}ms",
                        if e.timed_out { "Timeout" } else { "Network error" },
                        url,
                        attempt + 1,
                        wait.as_millis()
                    );
                    wait
                }
            };

            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    /// [`fetch`](Self::fetch) and decode the body as JSON.
    pub async fn fetch_json<D: DeserializeOwned>(&self, url: &str) -> Result<D, FetchError> {
        let body = self.fetch(url).await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
