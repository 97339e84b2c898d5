use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use thiserror::Error;

use crate::envelope::Payload;
use crate::retry::RETRYABLE_STATUSES;

/// Socket-level failure codes surfaced by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkErrorCode {
    ConnectionReset,
    ConnectionRefused,
    TimedOut,
    DnsFailure,
    Other,
}

impl NetworkErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionReset => "ECONNRESET",
            Self::ConnectionRefused => "ECONNREFUSED",
            Self::TimedOut => "ETIMEDOUT",
            Self::DnsFailure => "ENOTFOUND",
            Self::Other => "EUNKNOWN",
        }
    }

    /// Codes treated as transient by the retrying client.
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            Self::ConnectionReset | Self::TimedOut | Self::ConnectionRefused
        )
    }
}

impl Display for NetworkErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single logical request.
///
/// After retries are exhausted the caller receives the last observed error
/// unchanged, never a wrapper.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error ({code}): {message}")]
    Network {
        code: NetworkErrorCode,
        message: String,
    },

    #[error("request timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("upstream returned status {status}")]
    Status {
        status: u16,
        data: Payload,
        headers: BTreeMap<String, String>,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn network(code: NetworkErrorCode, message: impl Into<String>) -> Self {
        Self::Network {
            code,
            message: message.into(),
        }
    }

    pub fn status(status: u16, data: Payload) -> Self {
        Self::Status {
            status,
            data,
            headers: BTreeMap::new(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn network_code(&self) -> Option<NetworkErrorCode> {
        match self {
            Self::Network { code, .. } => Some(*code),
            Self::Timeout { .. } => Some(NetworkErrorCode::TimedOut),
            _ => None,
        }
    }

    /// Classification against the default allowlist.
    pub fn is_retryable(&self) -> bool {
        self.is_retryable_with(&RETRYABLE_STATUSES)
    }

    pub fn is_retryable_with(&self, retry_on_status: &[u16]) -> bool {
        match self {
            Self::Status { status, .. } => retry_on_status.contains(status),
            Self::Timeout { .. } => true,
            Self::Network { code, .. } => code.is_transient(),
            Self::InvalidRequest(_) => false,
        }
    }
}

/// Invalid client or CLI configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: String, value: String },

    #[error("base url cannot be empty")]
    EmptyBaseUrl,

    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },

    #[error("invalid backend '{value}', expected one of mercadolibre, mercadopago, hybrid")]
    InvalidBackend { value: String },

    #[error("invalid http method '{value}', expected one of GET, POST, PUT, PATCH, DELETE")]
    InvalidMethod { value: String },
}
