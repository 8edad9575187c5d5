// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Retry logic with decorrelated jitter for rate-limited remote calls.
//!
//! The AWS control-plane APIs (API Gateway in particular) throttle aggressively.
//! Every remote call goes through [`throttled_call`], which retries
//! throttling-class errors and fails fast on everything else.

use crate::constants::{
    THROTTLE_BACKOFF_MULTIPLIER, THROTTLE_MAX_ELAPSED_SECS, THROTTLE_MAX_WAIT_SECS,
    THROTTLE_MIN_WAIT_SECS,
};
use crate::errors::RemoteError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Decorrelated jitter backoff.
///
/// Each wait is drawn from `[0, min(max_interval, previous * multiplier)]`
/// and then raised to at least `min_interval`, so consecutive waits are
/// random but tend to grow.
#[derive(Debug, Clone)]
pub struct DecorrelatedJitterBackoff {
    /// Lower bound for every wait
    pub min_interval: Duration,
    /// Upper bound for every wait
    pub max_interval: Duration,
    /// Maximum total elapsed time
    pub max_elapsed_time: Option<Duration>,
    /// Growth factor applied to the previous wait
    pub multiplier: f64,
    previous_interval: Duration,
    start_time: Instant,
}

impl DecorrelatedJitterBackoff {
    /// Create a backoff policy; the elapsed-time budget starts now.
    #[must_use]
    pub fn new(
        min_interval: Duration,
        max_interval: Duration,
        max_elapsed_time: Option<Duration>,
        multiplier: f64,
    ) -> Self {
        Self {
            min_interval,
            max_interval,
            max_elapsed_time,
            multiplier,
            previous_interval: min_interval,
            start_time: Instant::now(),
        }
    }

    /// Get the next wait, or None once the elapsed-time budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let ceiling = self
            .previous_interval
            .mul_f64(self.multiplier)
            .min(self.max_interval);
        let wait = ceiling.mul_f64(rand::random::<f64>()).max(self.min_interval);

        self.previous_interval = wait;
        Some(wait)
    }

    /// Time spent since the policy was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn is_exhausted(&self) -> bool {
        self.max_elapsed_time
            .is_some_and(|max_elapsed| self.elapsed() >= max_elapsed)
    }
}

/// Backoff used for throttled remote calls.
///
/// # Configuration
///
/// - **Min wait**: 3 seconds
/// - **Max wait**: 60 seconds
/// - **Max elapsed time**: 5 minutes total
/// - **Multiplier**: 3.0
#[must_use]
pub fn throttling_backoff() -> DecorrelatedJitterBackoff {
    DecorrelatedJitterBackoff::new(
        Duration::from_secs(THROTTLE_MIN_WAIT_SECS),
        Duration::from_secs(THROTTLE_MAX_WAIT_SECS),
        Some(Duration::from_secs(THROTTLE_MAX_ELAPSED_SECS)),
        THROTTLE_BACKOFF_MULTIPLIER,
    )
}

/// Run a remote call, retrying throttling-class errors.
///
/// # Arguments
///
/// * `operation` - Async function that performs the remote call
/// * `operation_name` - Human-readable name for logging (e.g., "getDomainName")
///
/// # Errors
///
/// Returns the first non-throttling error unchanged, or the last throttling
/// error once the 5 minute budget is spent.
///
/// # Example
///
/// ```no_run
/// use apigw_domains::reconcilers::retry::throttled_call;
/// use apigw_domains::services::LegacyGatewayApi;
///
/// # async fn example(api: &dyn LegacyGatewayApi) -> Result<(), apigw_domains::errors::RemoteError> {
/// let info = throttled_call(|| api.get_domain_name("api.example.com"), "getDomainName").await?;
/// println!("{}", info.domain_name);
/// # Ok(())
/// # }
/// ```
pub async fn throttled_call<T, F, Fut>(operation: F, operation_name: &str) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    retry_with_backoff(throttling_backoff(), operation, operation_name).await
}

/// [`throttled_call`] with an explicit backoff policy.
///
/// # Errors
///
/// Same as [`throttled_call`].
pub async fn retry_with_backoff<T, F, Fut>(
    mut backoff: DecorrelatedJitterBackoff,
    mut operation: F,
    operation_name: &str,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        elapsed = ?backoff.elapsed(),
                        "Remote call succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) if !e.is_throttling() => return Err(e),
            Err(e) => {
                let Some(duration) = backoff.next_backoff() else {
                    error!(
                        operation = operation_name,
                        attempt = attempt,
                        elapsed = ?backoff.elapsed(),
                        error = %e,
                        "Throttling retry budget exhausted, giving up"
                    );
                    return Err(e);
                };

                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    retry_after = ?duration,
                    error = %e,
                    "Remote call throttled, will retry"
                );
                tokio::time::sleep(duration).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
