use mercado_core::{Backend, BackendProfile};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct BackendsResponseData {
    backends: Vec<BackendProfile>,
}

pub fn run() -> Result<Value, CliError> {
    let backends = Backend::ALL.into_iter().map(Backend::profile).collect();
    Ok(serde_json::to_value(BackendsResponseData { backends })?)
}
