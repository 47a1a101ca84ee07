//! Status interpretation and rate-limit backoff on top of an [`HttpTransport`].

use crate::http::{HttpResponse, HttpTransport};

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Added on top of the server-advertised delay.
pub const RETRY_MARGIN: Duration = Duration::from_secs(1);

/// Used when a 429 arrives without a usable `retry-after` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource not found")]
    NotFound,
    #[error("API request failed with status code {}", .0.as_u16())]
    Api(StatusCode),
    #[error("still rate limited after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },
    #[error("pagination cursor points back to {0}")]
    CursorLoop(String),
    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::NotFound => Some(StatusCode::NOT_FOUND),
            FetchError::Api(status) => Some(*status),
            FetchError::RateLimitExhausted { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            _ => None,
        }
    }
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub margin: Duration,
    /// Upper bound on requests per fetch. `None` keeps retrying until the
    /// server accepts the request.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            margin: RETRY_MARGIN,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn bounded(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: Some(max_attempts.max(1)),
            ..Default::default()
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    pub fn delay_for(&self, retry_after: Option<&str>) -> Duration {
        let advertised = retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETRY_AFTER);
        advertised + self.margin
    }
}

#[derive(Debug)]
pub struct Fetcher<T, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl<T: HttpTransport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Fetcher {
            transport,
            sleeper: ThreadSleeper,
            policy: RetryPolicy::default(),
        }
    }
}

impl<T: HttpTransport, S: Sleeper> Fetcher<T, S> {
    pub fn with_sleeper(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Fetcher {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Returns the first successful response for `url`. A 429 is waited out
    /// and the identical request is sent again; every other non-success
    /// status is returned as [`FetchError::Api`].
    pub fn fetch(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let mut attempts = 0;
        loop {
            let res = self.transport.get(url)?;
            attempts += 1;

            let status = res.status();
            if status.is_success() {
                return Ok(res);
            }
            if status != StatusCode::TOO_MANY_REQUESTS {
                if status == StatusCode::NOT_FOUND {
                    tracing::debug!("GET {url} returned {status}");
                } else {
                    tracing::warn!("GET {url} returned {status}");
                }
                return Err(FetchError::Api(status));
            }
            if self.policy.exhausted(attempts) {
                return Err(FetchError::RateLimitExhausted { attempts });
            }

            let delay = self.policy.delay_for(res.header(RETRY_AFTER_HEADER));
            tracing::warn!(
                "Rate limited, reattempting {url} in {}s (attempt {attempts})",
                delay.as_secs()
            );
            self.sleeper.sleep(delay);
        }
    }
}
