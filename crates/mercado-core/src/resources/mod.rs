//! Resource facades: thin per-endpoint methods over a [`PlatformClient`].
//!
//! Facades are generated from declarative tables by `endpoints!`; each
//! method only fills in the HTTP method, the path and the backend
//! credential, then forwards to [`PlatformClient::request`]. They perform
//! no retry, auth or error translation of their own.

use std::sync::Arc;

use crate::auth::Credential;
use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::http_client::HttpClient;
use crate::platform::PlatformClient;

/// Generates a facade struct with one async method per table row.
///
/// Row syntax: `fn name(arg, ...) => METHOD "/path/{arg}";`. Every `{arg}`
/// placeholder must name an argument; arguments are percent-encoded as path
/// segments.
macro_rules! endpoints {
    (
        $(#[$api_meta:meta])*
        $api:ident {
            $(
                $(#[$meta:meta])*
                fn $name:ident($($arg:ident),*) => $method:ident $path:literal;
            )*
        }
    ) => {
        $(#[$api_meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $api<'a> {
            client: &'a $crate::platform::PlatformClient,
            credential: &'a $crate::auth::Credential,
        }

        impl<'a> $api<'a> {
            pub fn new(
                client: &'a $crate::platform::PlatformClient,
                credential: &'a $crate::auth::Credential,
            ) -> Self {
                Self { client, credential }
            }

            pub fn client(&self) -> &'a $crate::platform::PlatformClient {
                self.client
            }

            $(
                $(#[$meta])*
                pub async fn $name(
                    &self,
                    $($arg: impl std::fmt::Display,)*
                    options: $crate::platform::RequestOptions<'_>,
                ) -> Result<$crate::envelope::ResponseEnvelope, $crate::error::ApiError> {
                    let path = format!(
                        $path,
                        $($arg = urlencoding::encode(&$arg.to_string())),*
                    );
                    let options = options
                        .method($crate::http_client::HttpMethod::$method)
                        .auth_or(self.credential);
                    self.client.request(&path, options).await
                }
            )*
        }
    };
}

mod hybrid;
mod mercadolibre;
mod mercadopago;

pub use hybrid::HybridApi;
pub use mercadolibre::MercadoLibreApi;
pub use mercadopago::MercadoPagoApi;

/// One platform client and one credential per backend.
#[derive(Debug, Clone)]
pub struct Sdk {
    mercadolibre: PlatformClient,
    mercadopago: PlatformClient,
    hybrid: PlatformClient,
    mercadolibre_credential: Credential,
    mercadopago_credential: Credential,
    hybrid_credential: Credential,
}

impl Default for Sdk {
    fn default() -> Self {
        Self::new()
    }
}

impl Sdk {
    /// Default configuration for every backend, no tokens set.
    pub fn new() -> Self {
        Self::from_clients(
            PlatformClient::for_backend(Backend::MercadoLibre),
            PlatformClient::for_backend(Backend::MercadoPago),
            PlatformClient::for_backend(Backend::Hybrid),
        )
    }

    /// Default configuration for every backend over a shared transport.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let client_for = |backend| {
            PlatformClient::with_http_client(ClientConfig::for_backend(backend), http_client.clone())
        };
        Self::from_clients(
            client_for(Backend::MercadoLibre),
            client_for(Backend::MercadoPago),
            client_for(Backend::Hybrid),
        )
    }

    /// Configuration and tokens from `MERCADOLIBRE_*`, `MERCADOPAGO_*` and
    /// `MERCADO_HYBRID_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut sdk = Self::from_clients(
            PlatformClient::new(ClientConfig::from_env(Backend::MercadoLibre)?),
            PlatformClient::new(ClientConfig::from_env(Backend::MercadoPago)?),
            PlatformClient::new(ClientConfig::from_env(Backend::Hybrid)?),
        );
        sdk.mercadolibre_credential = Credential::from_env(Backend::MercadoLibre);
        sdk.mercadopago_credential = Credential::from_env(Backend::MercadoPago);
        sdk.hybrid_credential = Credential::from_env(Backend::Hybrid);
        Ok(sdk)
    }

    pub fn from_clients(
        mercadolibre: PlatformClient,
        mercadopago: PlatformClient,
        hybrid: PlatformClient,
    ) -> Self {
        Self {
            mercadolibre,
            mercadopago,
            hybrid,
            mercadolibre_credential: Credential::new(),
            mercadopago_credential: Credential::new(),
            hybrid_credential: Credential::new(),
        }
    }

    pub fn client(&self, backend: Backend) -> &PlatformClient {
        match backend {
            Backend::MercadoLibre => &self.mercadolibre,
            Backend::MercadoPago => &self.mercadopago,
            Backend::Hybrid => &self.hybrid,
        }
    }

    pub fn credential(&self, backend: Backend) -> &Credential {
        match backend {
            Backend::MercadoLibre => &self.mercadolibre_credential,
            Backend::MercadoPago => &self.mercadopago_credential,
            Backend::Hybrid => &self.hybrid_credential,
        }
    }

    pub fn set_access_token(&self, backend: Backend, token: impl Into<String>) {
        self.credential(backend).set_access_token(token);
    }

    pub fn set_refresh_token(&self, backend: Backend, token: impl Into<String>) {
        self.credential(backend).set_refresh_token(token);
    }

    pub fn mercadolibre(&self) -> MercadoLibreApi<'_> {
        MercadoLibreApi::new(&self.mercadolibre, &self.mercadolibre_credential)
    }

    pub fn mercadopago(&self) -> MercadoPagoApi<'_> {
        MercadoPagoApi::new(&self.mercadopago, &self.mercadopago_credential)
    }

    pub fn hybrid(&self) -> HybridApi<'_> {
        HybridApi::new(&self.hybrid, &self.hybrid_credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthProvider;
    use crate::backend::{MERCADOLIBRE_BASE_URL, MERCADOPAGO_BASE_URL};
    use crate::http_client::ScriptedHttpClient;

    #[test]
    fn each_backend_gets_its_own_credential() {
        let sdk = Sdk::with_http_client(Arc::new(ScriptedHttpClient::default()));
        sdk.set_access_token(Backend::MercadoPago, "APP_USR-mp");

        assert!(sdk.credential(Backend::MercadoPago).is_authenticated());
        assert!(!sdk.credential(Backend::MercadoLibre).is_authenticated());
        assert!(!sdk
            .credential(Backend::Hybrid)
            .headers()
            .contains_key("authorization"));
    }

    #[test]
    fn clients_use_backend_hosts() {
        let sdk = Sdk::with_http_client(Arc::new(ScriptedHttpClient::default()));

        assert_eq!(sdk.client(Backend::MercadoLibre).config().base_url, MERCADOLIBRE_BASE_URL);
        assert_eq!(sdk.client(Backend::MercadoPago).config().base_url, MERCADOPAGO_BASE_URL);
        assert_eq!(sdk.client(Backend::Hybrid).config().base_url, MERCADOPAGO_BASE_URL);
    }
}
