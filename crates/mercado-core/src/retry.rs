//! Bounded retry with exponential backoff.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::auth::AuthProvider;
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;
use crate::http_client::{round_trip, HttpClient, HttpRequest};
use crate::throttling::RequestThrottle;

/// Statuses treated as transient.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(1_000);

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed { delay: Duration },
    /// `base * factor^(retry - 1)` before retry number `retry`.
    Exponential {
        base: Duration,
        factor: f64,
        /// Upper bound on a single delay, if any.
        max: Option<Duration>,
        /// Spread each delay by +/-50%.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::exponential(DEFAULT_RETRY_BASE_DELAY)
    }
}

impl Backoff {
    /// Doubling backoff without cap or jitter.
    pub const fn exponential(base: Duration) -> Self {
        Self::Exponential {
            base,
            factor: 2.0,
            max: None,
            jitter: false,
        }
    }

    pub const fn base(self) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { base, .. } => base,
        }
    }

    /// Delay before retry number `retry`, counted from 1.
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
                let nanos = (base.as_nanos() as f64 * factor.powi(exponent)).round();
                let mut delay = Duration::from_nanos(nanos.min(u64::MAX as f64) as u64);
                if let Some(max) = max {
                    delay = delay.min(max);
                }

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let random_offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms =
                        delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// When and how often a failed attempt is repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::default(),
            retry_on_status: RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn exponential(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::exponential(base_delay),
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn is_retryable(&self, error: &ApiError) -> bool {
        error.is_retryable_with(&self.retry_on_status)
    }

    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }
}

/// Executes requests through a transport with bounded, backoff-delayed retry.
///
/// Stateless between calls: the attempt counter lives inside one
/// [`RetryingClient::execute`] call only.
#[derive(Clone)]
pub struct RetryingClient {
    http_client: Arc<dyn HttpClient>,
    policy: RetryPolicy,
    throttle: Option<RequestThrottle>,
}

impl RetryingClient {
    pub fn new(http_client: Arc<dyn HttpClient>, policy: RetryPolicy) -> Self {
        Self {
            http_client,
            policy,
            throttle: None,
        }
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `request` until it succeeds, fails terminally, or retries run out.
    ///
    /// `auth` headers are resolved at the start of every attempt; headers
    /// already present on `request` take precedence over them. A non-2xx
    /// response becomes [`ApiError::Status`].
    pub async fn execute(
        &self,
        request: HttpRequest,
        auth: Option<&dyn AuthProvider>,
    ) -> Result<ResponseEnvelope, ApiError> {
        let mut retries = 0_u32;

        loop {
            if let Some(throttle) = &self.throttle {
                throttle.acquire().await;
            }

            let mut headers = auth.map(|provider| provider.headers()).unwrap_or_default();
            headers.extend(request.headers.clone());
            let attempt = HttpRequest {
                headers,
                ..request.clone()
            };

            debug!(
                method = %attempt.method,
                url = %attempt.url,
                attempt = retries + 1,
                "sending request"
            );

            let error = match round_trip(self.http_client.as_ref(), attempt)
                .await
                .and_then(ensure_success)
            {
                Ok(envelope) => return Ok(envelope),
                Err(error) => error,
            };

            if !self.policy.is_retryable(&error) || retries >= self.policy.max_retries {
                debug!(%error, attempts = retries + 1, "request failed");
                return Err(error);
            }

            retries += 1;
            let delay = self.policy.delay_for_retry(retries);
            warn!(
                %error,
                retry = retries,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

impl Debug for RetryingClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("policy", &self.policy)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

fn ensure_success(envelope: ResponseEnvelope) -> Result<ResponseEnvelope, ApiError> {
    if envelope.is_success() {
        return Ok(envelope);
    }
    Err(ApiError::Status {
        status: envelope.status,
        data: envelope.data,
        headers: envelope.headers,
    })
}
