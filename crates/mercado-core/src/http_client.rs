//! Single-round-trip transport.
//!
//! [`HttpClient`] is the pluggable seam that performs exactly one HTTP
//! exchange; [`round_trip`] bounds it with the configured timeout and turns
//! the raw response into a [`ResponseEnvelope`]. Non-2xx statuses are not
//! failures at this layer.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::DEFAULT_TIMEOUT;
use crate::envelope::{Payload, ResponseEnvelope};
use crate::error::{ApiError, ConfigError, NetworkErrorCode};

const USER_AGENT: &str = concat!("mercado-sdk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ConfigError::InvalidMethod {
                value: value.to_owned(),
            }),
        }
    }
}

/// Fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Merges `headers` into the request; later values win.
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, value) in headers {
            self.headers.insert(name.to_ascii_lowercase(), value);
        }
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Raw response as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub fn into_envelope(self) -> ResponseEnvelope {
        ResponseEnvelope {
            data: Payload::parse(self.body),
            status: self.status,
            headers: self.headers,
        }
    }
}

/// Transport contract: one network exchange, no retries.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, ApiError>> + Send + 'a>>;
}

/// Performs one exchange bounded by `request.timeout`.
///
/// When the deadline passes the in-flight future is dropped, which closes
/// the underlying connection, and [`ApiError::Timeout`] is returned.
pub async fn round_trip(
    client: &dyn HttpClient,
    request: HttpRequest,
) -> Result<ResponseEnvelope, ApiError> {
    let timeout = request.timeout;
    match tokio::time::timeout(timeout, client.execute(request)).await {
        Ok(result) => result.map(HttpResponse::into_envelope),
        Err(_) => Err(ApiError::Timeout { timeout }),
    }
}

/// Production transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(USER_AGENT)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, ApiError>> + Send + 'a>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self
                .client
                .request(method, &request.url)
                .timeout(request.timeout);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|error| map_reqwest_error(&error, request.timeout))?;

            let status = response.status().as_u16();
            let mut headers = BTreeMap::new();
            for (name, value) in response.headers() {
                let Ok(value) = value.to_str() else {
                    continue;
                };
                headers
                    .entry(name.as_str().to_owned())
                    .and_modify(|existing: &mut String| {
                        existing.push_str(", ");
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_owned());
            }
            debug!(status, url = %request.url, "response received");

            let body = response
                .text()
                .await
                .map_err(|error| map_reqwest_error(&error, request.timeout))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn map_reqwest_error(error: &reqwest::Error, timeout: Duration) -> ApiError {
    if error.is_timeout() {
        return ApiError::Timeout { timeout };
    }
    if error.is_builder() {
        return ApiError::invalid_request(error.to_string());
    }

    let message = error_chain(error);
    let code = match io_error_kind(error) {
        Some(std::io::ErrorKind::ConnectionRefused) => NetworkErrorCode::ConnectionRefused,
        Some(
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof,
        ) => NetworkErrorCode::ConnectionReset,
        Some(std::io::ErrorKind::TimedOut) => NetworkErrorCode::TimedOut,
        _ if message.contains("dns error") => NetworkErrorCode::DnsFailure,
        _ if error.is_connect() => NetworkErrorCode::ConnectionRefused,
        _ => NetworkErrorCode::Other,
    };

    ApiError::network(code, message)
}

fn io_error_kind(error: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    let mut source = Some(error);
    while let Some(current) = source {
        if let Some(io_error) = current.downcast_ref::<std::io::Error>() {
            return Some(io_error.kind());
        }
        source = current.source();
    }
    None
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(current) = source {
        message.push_str(": ");
        message.push_str(&current.to_string());
        source = current.source();
    }
    message
}

/// One scripted outcome for [`ScriptedHttpClient`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond(HttpResponse),
    Fail(ApiError),
    /// Never completes; only the caller's timeout ends the call.
    Hang,
}

/// Deterministic offline transport that replays a fixed script.
///
/// A test double for code built on [`HttpClient`]; it never touches the
/// network and is not meant for production clients.
///
/// Every executed request is recorded together with the tokio clock reading
/// at which it started. Once the script runs out it answers `200 {}`.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    script: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<(tokio::time::Instant, HttpRequest)>>,
}

impl ScriptedHttpClient {
    pub fn new(script: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script that answers each status in order with the same body.
    pub fn statuses(statuses: impl IntoIterator<Item = u16>, body: &str) -> Self {
        Self::new(
            statuses
                .into_iter()
                .map(|status| ScriptedReply::Respond(HttpResponse::new(status, body))),
        )
    }

    pub fn push(&self, reply: ScriptedReply) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Gaps between consecutive attempts.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls
            .windows(2)
            .map(|pair| pair[1].0.duration_since(pair[0].0))
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, ApiError>> + Send + 'a>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((tokio::time::Instant::now(), request));
        let reply = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        Box::pin(async move {
            match reply {
                Some(ScriptedReply::Respond(response)) => Ok(response),
                Some(ScriptedReply::Fail(error)) => Err(error),
                Some(ScriptedReply::Hang) => std::future::pending().await,
                None => Ok(HttpResponse::ok_json("{}")),
            }
        })
    }
}
