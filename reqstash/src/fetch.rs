//! Resilient fetching with fixed-delay retry.
//!
//! A single attempt fails when the transport cannot produce a response or
//! when the response status falls outside `[200, 300)`. Both kinds of
//! failure are retried alike.
//!
//! The first attempt is free; the retry budget only counts the attempts
//! made after a failure. With `retries = 2` the upstream is called at most
//! three times, with the configured delay between consecutive calls.
//!
//! ```
//! use std::time::Duration;
//! use reqstash::fetch::RetryPolicy;
//!
//! let policy = RetryPolicy::fixed(2, Duration::from_millis(10));
//! assert_eq!(policy.attempts(), 3);
//! assert_eq!(RetryPolicy::none().attempts(), 1);
//! ```

use std::time::Duration;

use reqstash_core::{RequestDescriptor, Transport, TransportError, TransportResponse};
use thiserror::Error;
use tracing::{debug, error};

/// Outcome of one failed attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response was received with a non-success status.
    #[error("upstream responded with status {}", .0.status)]
    Status(TransportResponse),
}

impl AttemptError {
    /// Returns the failed response, if one was received.
    pub fn response(&self) -> Option<&TransportResponse> {
        match self {
            AttemptError::Status(response) => Some(response),
            AttemptError::Transport(_) => None,
        }
    }
}

/// The last failure after the retry budget was used up.
#[derive(Debug, Error)]
#[error("request to {location} failed after {attempts} attempt(s): {last}")]
pub struct FetchError {
    /// Location of the failed request.
    pub location: String,
    /// Total number of attempts made.
    pub attempts: u32,
    /// The failure of the final attempt.
    #[source]
    pub last: AttemptError,
}

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// A policy retrying up to `retries` times, waiting `delay` before each retry.
    pub const fn fixed(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Returns the retry budget.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns the wait between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the maximum number of attempts, first one included.
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Performs the request, retrying failed attempts.
    ///
    /// Attempts are strictly sequential. When the budget is exhausted the
    /// failure of the last attempt is returned.
    pub async fn fetch<T>(
        &self,
        transport: &T,
        descriptor: &RequestDescriptor,
    ) -> Result<TransportResponse, FetchError>
    where
        T: Transport + ?Sized,
    {
        let location = descriptor.request_url().unwrap_or_default();
        let mut remaining = self.retries;
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            match attempt(transport, descriptor).await {
                Ok(response) => {
                    if attempts > 1 {
                        debug!(url = %location, attempts, "request succeeded after retries");
                    }
                    return Ok(response);
                }
                Err(err) if remaining > 0 => {
                    error!(url = %location, error = %err, retry = remaining, "request attempt failed");
                    remaining -= 1;
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(last) => {
                    return Err(FetchError {
                        location,
                        attempts,
                        last,
                    });
                }
            }
        }
    }
}

async fn attempt<T>(
    transport: &T,
    descriptor: &RequestDescriptor,
) -> Result<TransportResponse, AttemptError>
where
    T: Transport + ?Sized,
{
    let response = transport.send(descriptor).await?;
    if response.is_success() {
        Ok(response)
    } else {
        Err(AttemptError::Status(response))
    }
}
