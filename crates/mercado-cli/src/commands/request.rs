use std::time::Duration;

use mercado_core::{ClientConfig, Credential, PlatformClient, QueryParams, RequestOptions};
use serde_json::Value;
use tracing::debug;

use crate::cli::RequestArgs;
use crate::error::CliError;

pub async fn run(args: &RequestArgs) -> Result<Value, CliError> {
    let config = build_config(args)?;
    let credential = match &args.token {
        Some(token) => Credential::with_access_token(token.clone()),
        None => Credential::from_env(args.backend),
    };
    debug!(
        backend = %args.backend,
        base_url = %config.base_url,
        authenticated = credential.is_authenticated(),
        "issuing request"
    );

    let mut options = RequestOptions::new(args.method)
        .params(args.params.iter().cloned().collect::<QueryParams>())
        .auth(&credential);
    if let Some(body) = &args.body {
        options = options.body(serde_json::from_str(body).map_err(CliError::InvalidBody)?);
    }
    if let Some(key) = &args.idempotency_key {
        options = options.idempotency_key(key.clone());
    }

    let client = PlatformClient::new(config);
    let envelope = client.request(&args.path, options).await?;
    Ok(serde_json::to_value(envelope)?)
}

fn build_config(args: &RequestArgs) -> Result<ClientConfig, CliError> {
    build_config_with(args, |name| std::env::var(name).ok())
}

/// Environment first, then flags. Variables replaced by a flag are never
/// read, so a malformed value cannot block its own override.
fn build_config_with(
    args: &RequestArgs,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, CliError> {
    let profile = args.backend.profile();
    let overridden = [
        ("BASE_URL", args.base_url.is_some()),
        ("TIMEOUT_MS", args.timeout_ms.is_some()),
        ("MAX_RETRIES", args.max_retries.is_some()),
        ("RETRY_BASE_DELAY_MS", args.base_delay_ms.is_some()),
    ]
    .into_iter()
    .filter(|(_, set)| *set)
    .map(|(suffix, _)| profile.env_var(suffix))
    .collect::<Vec<_>>();

    let mut config = ClientConfig::from_lookup(args.backend, |name| {
        if overridden.iter().any(|hidden| hidden == name) {
            None
        } else {
            lookup(name)
        }
    })?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    if let Some(retries) = args.max_retries {
        config = config.with_max_retries(retries);
    }
    if let Some(ms) = args.base_delay_ms {
        config = config.with_base_delay(Duration::from_millis(ms));
    }
    config.validate()?;
    Ok(config)
}
