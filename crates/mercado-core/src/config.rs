//! Per-client configuration.
//!
//! A [`ClientConfig`] is fixed when a platform client is built. Values come
//! from [`Default`] (the documented policy), from a [`Backend`] profile, or
//! from `<PREFIX>_*` environment variables:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `<PREFIX>_BASE_URL` | Override the backend host |
//! | `<PREFIX>_TIMEOUT_MS` | Per-attempt timeout |
//! | `<PREFIX>_MAX_RETRIES` | Retries after the first attempt |
//! | `<PREFIX>_RETRY_BASE_DELAY_MS` | First backoff delay |
//! | `<PREFIX>_RATE_LIMIT_PER_MINUTE` | Optional client-side request budget |

use std::time::Duration;

use crate::backend::{Backend, MERCADOLIBRE_BASE_URL};
use crate::error::ConfigError;
use crate::retry::{Backoff, RetryPolicy};
use crate::throttling::RateLimit;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bound on a single attempt, not on the whole retry sequence.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub rate_limit: Option<RateLimit>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(MERCADOLIBRE_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            rate_limit: None,
        }
    }

    pub fn for_backend(backend: Backend) -> Self {
        Self::new(backend.profile().base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Sets the first backoff delay, keeping the backoff shape.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.retry.backoff = match self.retry.backoff {
            Backoff::Fixed { .. } => Backoff::Fixed { delay: base_delay },
            Backoff::Exponential {
                factor, max, jitter, ..
            } => Backoff::Exponential {
                base: base_delay,
                factor,
                max,
                jitter,
            },
        };
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.retry.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.retry.backoff.base()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                value: base_url.to_owned(),
            });
        }
        Ok(())
    }

    pub fn from_env(backend: Backend) -> Result<Self, ConfigError> {
        Self::from_lookup(backend, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        backend: Backend,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let profile = backend.profile();
        let mut config = Self::for_backend(backend);

        if let Some(base_url) = lookup(&profile.env_var("BASE_URL")) {
            config.base_url = base_url;
        }
        if let Some(ms) = read_number(&lookup, &profile.env_var("TIMEOUT_MS"))? {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(retries) = read_number(&lookup, &profile.env_var("MAX_RETRIES"))? {
            let retries = u32::try_from(retries).map_err(|_| ConfigError::InvalidNumber {
                name: profile.env_var("MAX_RETRIES"),
                value: retries.to_string(),
            })?;
            config = config.with_max_retries(retries);
        }
        if let Some(ms) = read_number(&lookup, &profile.env_var("RETRY_BASE_DELAY_MS"))? {
            config = config.with_base_delay(Duration::from_millis(ms));
        }
        if let Some(limit) = read_number(&lookup, &profile.env_var("RATE_LIMIT_PER_MINUTE"))? {
            let limit = u32::try_from(limit).unwrap_or(u32::MAX);
            config = config.with_rate_limit(RateLimit::per_minute(limit));
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_number(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber {
            name: name.to_owned(),
            value: raw,
        })
}
