use mercado_core::{ApiError, ConfigError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid --body: {0}")]
    InvalidBody(serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::InvalidBody(_) => 2,
            Self::Api(ApiError::InvalidRequest(_)) => 2,
            Self::Api(ApiError::Status { .. }) => 3,
            Self::Serialization(_) => 4,
            Self::Api(ApiError::Timeout { .. }) => 5,
            Self::Api(ApiError::Network { .. }) => 6,
            Self::Io(_) => 10,
        }
    }
}
