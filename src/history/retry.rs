use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::api::ApiError;

/// Failures worth waiting out. Matched on the error message, since the
/// exchange reports rate limiting only as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientFailure {
    RateLimited,
    BadGateway,
    GatewayTimeout,
}

impl TransientFailure {
    const SIGNATURES: [(&'static str, TransientFailure); 3] = [
        ("time wait restriction, please try later.", TransientFailure::RateLimited),
        ("return status code is 502", TransientFailure::BadGateway),
        ("return status code is 504", TransientFailure::GatewayTimeout),
    ];

    pub fn classify(err: &ApiError) -> Option<Self> {
        let message = err.to_string();
        Self::SIGNATURES
            .iter()
            .find(|(signature, _)| message.contains(signature))
            .map(|(_, failure)| *failure)
    }
}

impl fmt::Display for TransientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransientFailure::RateLimited => write!(f, "rate limit exceeded"),
            TransientFailure::BadGateway => write!(f, "502 error"),
            TransientFailure::GatewayTimeout => write!(f, "504 error"),
        }
    }
}

/// Fixed-interval retry policy for transient failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Sleep between a failed attempt and the next one
    pub wait_interval: Duration,
    /// Retries allowed after the first attempt; `None` retries forever
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    pub fn new(wait_interval: Duration) -> Self {
        Self {
            wait_interval,
            max_retries: None,
        }
    }

    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether another attempt may follow `retries_done` retries
    fn allows_retry(&self, retries_done: u32) -> bool {
        self.max_retries.is_none_or(|max| retries_done < max)
    }

    /// Run `op` until it succeeds, sleeping `wait_interval` after each
    /// transient failure. Any other error is returned immediately.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut retries = 0u32;
        loop {
            log::debug!("{}: attempt {}", label, retries + 1);

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some(failure) = TransientFailure::classify(&err) else {
                return Err(err);
            };
            if !self.allows_retry(retries) {
                log::error!("{}: {} after {} retries, giving up", label, failure, retries);
                return Err(err);
            }

            log::warn!(
                "{}: {}. wait {:.1}s and retry...",
                label,
                failure,
                self.wait_interval.as_secs_f64()
            );
            tokio::time::sleep(self.wait_interval).await;
            retries += 1;
        }
    }
}
