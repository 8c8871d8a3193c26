//
//  bitbucket-provider
//  resources/retry.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Bounded retry for operations the remote is slow to accept.
//!
//! Only pipeline-config enablement after a repository create or fork uses this:
//! the repository can answer 403/404 for a while before pipelines may be
//! switched on.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::{info, warn};

use crate::api::common::{ProviderError, Result};

/// Fixed-interval retry bounded by a total time budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// A backoff that waits `interval` between attempts and gives up once
    /// `timeout` has elapsed.
    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.interval,
            max_interval: self.interval,
            multiplier: 1.0,
            randomization_factor: 0.0,
            max_elapsed_time: Some(self.timeout),
            ..ExponentialBackoff::default()
        };
        backoff.reset();
        backoff
    }

    /// Runs `op` until it succeeds, fails with an error `retryable` rejects, or
    /// the backoff reports that the time budget is spent.
    ///
    /// # Arguments
    ///
    /// * `retryable` - Decides which errors are worth another attempt
    /// * `op` - Produces a fresh future for every attempt
    ///
    /// # Errors
    ///
    /// Non-retryable errors are returned as-is. Running out of time returns
    /// [`ProviderError::RetryTimeout`] carrying the last error message.
    pub async fn execute<T, F, Fut, P>(&self, retryable: P, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&ProviderError) -> bool,
    {
        let mut backoff = self.backoff();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if retryable(&e) => match backoff.next_backoff() {
                    Some(wait) => {
                        warn!(attempt, error = %e, "Retrying after transient error");
                        tokio::time::sleep(wait).await;
                    }
                    None => {
                        info!(attempt, "Retry budget of {}s exhausted", self.timeout.as_secs());
                        return Err(ProviderError::RetryTimeout {
                            waited_secs: backoff.get_elapsed_time().as_secs(),
                            last_error: e.to_string(),
                        });
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn not_found() -> ProviderError {
        ProviderError::NotFound("pipelines_config".to_string())
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_errors() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(Duration::from_secs(5), Duration::from_millis(1));

        let result = policy
            .execute(ProviderError::is_permission_or_not_found, || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(not_found())
                } else {
                    Ok("enabled")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "enabled");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(Duration::from_secs(5), Duration::from_millis(1));

        let result: Result<()> = policy
            .execute(ProviderError::is_permission_or_not_found, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Validation("bad".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ProviderError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_times_out() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(Duration::from_millis(50), Duration::from_millis(20));

        let result: Result<()> = policy
            .execute(ProviderError::is_permission_or_not_found, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(not_found())
            })
            .await;

        match result {
            Err(ProviderError::RetryTimeout { last_error, .. }) => {
                assert!(last_error.contains("pipelines_config"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
        // 20ms apart inside a 50ms budget leaves room for a handful of attempts only.
        assert!(calls.load(Ordering::SeqCst) <= 4);
    }
}
