//! Bearer-token credentials and the header capability shared by all backends.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

use crate::backend::Backend;

/// Anything that can produce request headers for an outgoing call.
///
/// Implementations are consulted once per attempt, so a token rotated while
/// a retry sequence is in flight is picked up by the next attempt.
pub trait AuthProvider: Send + Sync {
    fn headers(&self) -> BTreeMap<String, String>;
}

/// `content-type` and `accept` headers sent with every authenticated call.
pub fn json_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        (String::from("content-type"), String::from("application/json")),
        (String::from("accept"), String::from("application/json")),
    ])
}

#[derive(Default)]
struct Tokens {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Shared, rotatable token handle.
///
/// Clones share state: rotating the token through one clone is visible to
/// every other clone, including calls already in flight.
#[derive(Clone, Default)]
pub struct Credential {
    tokens: Arc<RwLock<Tokens>>,
}

impl Credential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(token: impl Into<String>) -> Self {
        let credential = Self::new();
        credential.set_access_token(token);
        credential
    }

    /// Reads `<PREFIX>_ACCESS_TOKEN` and `<PREFIX>_REFRESH_TOKEN` for `backend`.
    pub fn from_env(backend: Backend) -> Self {
        Self::from_lookup(backend, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(backend: Backend, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let profile = backend.profile();
        let credential = Self::new();
        if let Some(token) = lookup(&profile.env_var("ACCESS_TOKEN")) {
            credential.set_access_token(token);
        }
        if profile.uses_refresh_token {
            if let Some(token) = lookup(&profile.env_var("REFRESH_TOKEN")) {
                credential.set_refresh_token(token);
            }
        }
        credential
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        self.write(|tokens| tokens.access_token = Some(token.into()));
    }

    pub fn set_refresh_token(&self, token: impl Into<String>) {
        self.write(|tokens| tokens.refresh_token = Some(token.into()));
    }

    pub fn clear(&self) {
        self.write(|tokens| *tokens = Tokens::default());
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(|tokens| tokens.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(|tokens| tokens.refresh_token.clone())
    }

    /// True when a non-empty access token is set.
    pub fn is_authenticated(&self) -> bool {
        self.read(|tokens| {
            tokens
                .access_token
                .as_deref()
                .is_some_and(|token| !token.is_empty())
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Tokens) -> T) -> T {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        f(&tokens)
    }

    fn write(&self, f: impl FnOnce(&mut Tokens)) {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut tokens);
    }
}

impl AuthProvider for Credential {
    fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = json_headers();
        self.read(|tokens| {
            if let Some(token) = tokens.access_token.as_deref().filter(|t| !t.is_empty()) {
                headers.insert(String::from("authorization"), format!("Bearer {token}"));
            }
        });
        headers
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (access, refresh) = self.read(|tokens| {
            (tokens.access_token.is_some(), tokens.refresh_token.is_some())
        });
        f.debug_struct("Credential")
            .field("access_token", &access.then_some("<redacted>"))
            .field("refresh_token", &refresh.then_some("<redacted>"))
            .finish()
    }
}
