use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MERCADOLIBRE_BASE_URL: &str = "https://api.mercadolibre.com";
pub const MERCADOPAGO_BASE_URL: &str = "https://api.mercadopago.com";

/// REST surfaces the SDK talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    MercadoLibre,
    MercadoPago,
    /// Cross-platform surface served from the Mercado Pago host but
    /// authenticated independently.
    Hybrid,
}

impl Backend {
    pub const ALL: [Self; 3] = [Self::MercadoLibre, Self::MercadoPago, Self::Hybrid];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MercadoLibre => "mercadolibre",
            Self::MercadoPago => "mercadopago",
            Self::Hybrid => "hybrid",
        }
    }

    pub const fn profile(self) -> BackendProfile {
        match self {
            Self::MercadoLibre => BackendProfile {
                backend: self,
                base_url: MERCADOLIBRE_BASE_URL,
                env_prefix: "MERCADOLIBRE",
                uses_refresh_token: true,
            },
            Self::MercadoPago => BackendProfile {
                backend: self,
                base_url: MERCADOPAGO_BASE_URL,
                env_prefix: "MERCADOPAGO",
                uses_refresh_token: false,
            },
            Self::Hybrid => BackendProfile {
                backend: self,
                base_url: MERCADOPAGO_BASE_URL,
                env_prefix: "MERCADO_HYBRID",
                uses_refresh_token: false,
            },
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mercadolibre" | "ml" => Ok(Self::MercadoLibre),
            "mercadopago" | "mp" => Ok(Self::MercadoPago),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ConfigError::InvalidBackend {
                value: other.to_owned(),
            }),
        }
    }
}

/// Static description of a backend: where it lives and where its settings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackendProfile {
    pub backend: Backend,
    pub base_url: &'static str,
    /// Prefix of the environment variables read by `ClientConfig::from_env`
    /// and `Credential::from_env`.
    pub env_prefix: &'static str,
    pub uses_refresh_token: bool,
}

impl BackendProfile {
    pub fn env_var(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.env_prefix)
    }
}
