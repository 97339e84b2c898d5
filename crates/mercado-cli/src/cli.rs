//! CLI argument definitions for `mercado`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `request` | Issue one request through a backend client and print the envelope |
//! | `backends` | List backend profiles (host, env prefix) |
//!
//! # Examples
//!
//! ```bash
//! # Public marketplace endpoint
//! mercado request GET /sites/MLA/categories --pretty
//!
//! # Authenticated payment search, token from MERCADOPAGO_ACCESS_TOKEN
//! mercado request GET /v1/payments/search --backend mp --param status=approved
//!
//! # Payment creation with an idempotency key
//! mercado request POST /v1/payments --backend mp \
//!     --body '{"transaction_amount":100,"payment_method_id":"pix"}' \
//!     --idempotency-key 5b1d7c1e-order-42
//! ```

use clap::{Args, Parser, Subcommand};
use mercado_core::{Backend, HttpMethod};

/// Raw access to the Mercado Libre and Mercado Pago REST APIs.
#[derive(Debug, Parser)]
#[command(name = "mercado", author, version, about)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log retries and attempts to stderr (-v debug for the SDK, -vv everything).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one request and print `{data, status, headers}`.
    ///
    /// Configuration is read from `<PREFIX>_*` environment variables first
    /// (see `mercado backends`); flags override them.
    Request(RequestArgs),

    /// List backend profiles as JSON.
    Backends,
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method: GET, POST, PUT, PATCH or DELETE.
    pub method: HttpMethod,

    /// Path relative to the backend host, e.g. `/users/me`.
    pub path: String,

    /// Backend to call: mercadolibre (ml), mercadopago (mp) or hybrid.
    #[arg(long, default_value = "ml")]
    pub backend: Backend,

    /// Query parameter as `key=value`; repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// JSON request body.
    #[arg(long)]
    pub body: Option<String>,

    /// Access token; defaults to `<PREFIX>_ACCESS_TOKEN`.
    #[arg(long)]
    pub token: Option<String>,

    /// Value for the `X-Idempotency-Key` header.
    #[arg(long)]
    pub idempotency_key: Option<String>,

    /// Per-attempt timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// First backoff delay in milliseconds; doubles on each retry.
    #[arg(long)]
    pub base_delay_ms: Option<u64>,

    /// Override the backend host.
    #[arg(long)]
    pub base_url: Option<String>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
