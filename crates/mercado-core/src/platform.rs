//! One parameterised client per backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::AuthProvider;
use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient};
use crate::query::QueryParams;
use crate::retry::RetryingClient;
use crate::throttling::RequestThrottle;

pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

/// Fresh random key for [`RequestOptions::idempotency_key`].
pub fn generate_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

/// Per-call options for [`PlatformClient::request`].
#[derive(Clone, Default)]
pub struct RequestOptions<'a> {
    pub method: HttpMethod,
    pub params: QueryParams,
    pub body: Option<Value>,
    pub auth: Option<&'a dyn AuthProvider>,
    pub headers: BTreeMap<String, String>,
}

impl<'a> RequestOptions<'a> {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn post() -> Self {
        Self::new(HttpMethod::Post)
    }

    pub fn put() -> Self {
        Self::new(HttpMethod::Put)
    }

    pub fn patch() -> Self {
        Self::new(HttpMethod::Patch)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|error| ApiError::invalid_request(format!("body is not serializable: {error}")))?;
        Ok(self.body(value))
    }

    pub fn auth(mut self, auth: &'a dyn AuthProvider) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets `auth` unless the caller already chose a provider.
    pub fn auth_or(mut self, auth: &'a dyn AuthProvider) -> Self {
        if self.auth.is_none() {
            self.auth = Some(auth);
        }
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Attaches an idempotency key, sent unchanged on every retry.
    pub fn idempotency_key(self, key: impl Into<String>) -> Self {
        self.header(IDEMPOTENCY_HEADER, key)
    }
}

impl std::fmt::Debug for RequestOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("params", &self.params)
            .field("body", &self.body)
            .field("auth", &self.auth.is_some())
            .field("headers", &self.headers)
            .finish()
    }
}

/// Binds a [`ClientConfig`] to a [`RetryingClient`].
///
/// The same type serves every backend; only the configuration differs.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    config: ClientConfig,
    retrying: RetryingClient,
}

impl PlatformClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn for_backend(backend: Backend) -> Self {
        Self::new(ClientConfig::for_backend(backend))
    }

    pub fn with_http_client(config: ClientConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let mut retrying = RetryingClient::new(http_client, config.retry.clone());
        if let Some(limit) = config.rate_limit {
            retrying = retrying.with_throttle(RequestThrottle::new(limit));
        }
        Self { config, retrying }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL + path + encoded query string.
    pub fn url_for(&self, path: &str, params: &QueryParams) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let separator = if path.starts_with('/') { "" } else { "/" };
        let query = params.to_query_string();
        if query.is_empty() {
            format!("{base}{separator}{path}")
        } else {
            format!("{base}{separator}{path}?{query}")
        }
    }

    /// Issues `options.method` against `path`.
    ///
    /// Errors propagate unchanged from the retrying client.
    #[instrument(skip_all, fields(method = %options.method, path = %path))]
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions<'_>,
    ) -> Result<ResponseEnvelope, ApiError> {
        let url = self.url_for(path, &options.params);
        let mut request = HttpRequest::new(options.method, url)
            .with_headers(options.headers)
            .with_timeout(self.config.timeout);
        if let Some(body) = options.body {
            request = request.with_body(body);
        }

        self.retrying.execute(request, options.auth).await
    }

    pub async fn get(
        &self,
        path: &str,
        params: QueryParams,
        auth: Option<&dyn AuthProvider>,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.request(path, with_auth(RequestOptions::get().params(params), auth))
            .await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Value,
        auth: Option<&dyn AuthProvider>,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.request(path, with_auth(RequestOptions::post().body(body), auth))
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Value,
        auth: Option<&dyn AuthProvider>,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.request(path, with_auth(RequestOptions::put().body(body), auth))
            .await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: Value,
        auth: Option<&dyn AuthProvider>,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.request(path, with_auth(RequestOptions::patch().body(body), auth))
            .await
    }

    pub async fn delete(
        &self,
        path: &str,
        auth: Option<&dyn AuthProvider>,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.request(path, with_auth(RequestOptions::delete(), auth))
            .await
    }
}

fn with_auth<'a>(
    options: RequestOptions<'a>,
    auth: Option<&'a dyn AuthProvider>,
) -> RequestOptions<'a> {
    match auth {
        Some(auth) => options.auth(auth),
        None => options,
    }
}
