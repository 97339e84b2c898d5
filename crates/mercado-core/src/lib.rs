//! # Mercado Core
//!
//! Request layer shared by every Mercado Libre and Mercado Pago API call.
//!
//! ## Overview
//!
//! - **Auth providers** produce `content-type`, `accept` and, when a token is
//!   set, `authorization: Bearer` headers
//! - **Transport** performs one HTTP round trip with a timeout and degrades
//!   unparseable bodies to raw text
//! - **Retrying client** repeats transient failures with exponential backoff
//! - **Platform clients** own a base URL and policy per backend and build
//!   URLs and query strings
//! - **Resource facades** map endpoints onto platform client calls
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`auth`] | `AuthProvider` capability and the shared `Credential` handle |
//! | [`backend`] | Backend identifiers and profiles |
//! | [`config`] | Per-client configuration and environment loading |
//! | [`envelope`] | `{data, status, headers}` response envelope |
//! | [`error`] | Error taxonomy and retry classification |
//! | [`http_client`] | Transport trait, reqwest transport, scripted test transport |
//! | [`platform`] | `PlatformClient` and `RequestOptions` |
//! | [`query`] | Ordered query parameters and encoding |
//! | [`resources`] | Generated facades and the `Sdk` bundle |
//! | [`retry`] | Backoff, retry policy and the retrying client |
//! | [`throttling`] | Optional client-side rate limiting |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mercado_core::{Backend, QueryParams, RequestOptions, Sdk};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sdk = Sdk::new();
//!     sdk.set_access_token(Backend::MercadoLibre, "APP_USR-...");
//!
//!     let me = sdk.mercadolibre().me(RequestOptions::get()).await?;
//!     println!("{}: {:?}", me.status, me.data);
//!
//!     let results = sdk
//!         .mercadolibre()
//!         .search_items("MLA", RequestOptions::get().params(QueryParams::new().with("q", "mate")))
//!         .await?;
//!     println!("{:?}", results.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Resource Facade │
//! └────────┬────────┘
//!          │ request(path, options)
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Platform Client │────▶│ Auth Provider    │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Retrying Client │────▶│ Throttle (opt.)  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ HTTP Transport  │
//! │ (reqwest)       │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use mercado_core::ApiError;
//!
//! fn describe(error: &ApiError) -> String {
//!     match error {
//!         ApiError::Status { status: 401 | 403, .. } => String::from("token rejected"),
//!         ApiError::Status { status, .. } => format!("upstream answered {status}"),
//!         ApiError::Timeout { .. } => String::from("upstream too slow"),
//!         ApiError::Network { code, .. } => format!("network failure {code}"),
//!         ApiError::InvalidRequest(message) => message.clone(),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Tokens are read from the environment or set in code, never logged
//! - `Credential`'s `Debug` output redacts tokens

pub mod auth;
pub mod backend;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod platform;
pub mod query;
pub mod resources;
pub mod retry;
pub mod throttling;

// Auth
pub use auth::{json_headers, AuthProvider, Credential};

// Backends
pub use backend::{Backend, BackendProfile, MERCADOLIBRE_BASE_URL, MERCADOPAGO_BASE_URL};

// Configuration
pub use config::{ClientConfig, DEFAULT_TIMEOUT};

// Envelope types
pub use envelope::{Payload, ResponseEnvelope};

// Error types
pub use error::{ApiError, ConfigError, NetworkErrorCode};

// HTTP transport
pub use http_client::{
    round_trip, HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient, ScriptedReply,
};

// Platform clients
pub use platform::{generate_idempotency_key, PlatformClient, RequestOptions, IDEMPOTENCY_HEADER};

// Query strings
pub use query::QueryParams;

// Facades
pub use resources::{HybridApi, MercadoLibreApi, MercadoPagoApi, Sdk};

// Retry logic
pub use retry::{
    Backoff, RetryPolicy, RetryingClient, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY,
    RETRYABLE_STATUSES,
};

// Throttling
pub use throttling::{RateLimit, RequestThrottle};
