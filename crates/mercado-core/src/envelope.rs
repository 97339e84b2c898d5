//! Response envelope returned by every completed request.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Response body: parsed JSON when possible, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Raw(String),
}

impl Payload {
    /// Parses `text` as JSON, degrading to [`Payload::Raw`] instead of failing.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(text),
        }
    }

    pub fn empty() -> Self {
        Self::Raw(String::new())
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Raw(text) => Some(text),
        }
    }

    /// Decodes a JSON payload into a typed value. Raw payloads are decoded as a JSON string.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Self::Json(value) => T::deserialize(value),
            Self::Raw(text) => T::deserialize(Value::String(text.clone())),
        }
    }
}

/// `{data, status, headers}` of a completed round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub data: Payload,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    pub fn new(status: u16, data: Payload) -> Self {
        Self {
            data,
            status,
            headers: BTreeMap::new(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        self.data.decode()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_degrades_to_raw_text() {
        assert_eq!(Payload::parse(r#"{"ok":true}"#), Payload::Json(json!({"ok": true})));
        assert_eq!(
            Payload::parse("<html>bad gateway</html>"),
            Payload::Raw(String::from("<html>bad gateway</html>"))
        );
        assert_eq!(Payload::parse(""), Payload::empty());
    }

    #[test]
    fn serializes_payload_untagged() {
        let envelope = ResponseEnvelope::new(200, Payload::Raw(String::from("plain")));
        let value = serde_json::to_value(&envelope).expect("serializable");
        assert_eq!(value, json!({"data": "plain", "status": 200, "headers": {}}));
    }

    #[test]
    fn decodes_typed_body() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: u64,
            nickname: String,
        }

        let envelope = ResponseEnvelope::new(
            200,
            Payload::parse(r#"{"id":42,"nickname":"TESTUSER"}"#),
        );
        let user: User = envelope.json().expect("valid user");
        assert_eq!(
            user,
            User {
                id: 42,
                nickname: String::from("TESTUSER")
            }
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut envelope = ResponseEnvelope::new(204, Payload::empty());
        envelope
            .headers
            .insert(String::from("x-request-id"), String::from("abc"));
        assert_eq!(envelope.header("X-Request-Id"), Some("abc"));
        assert!(envelope.is_success());
    }
}
