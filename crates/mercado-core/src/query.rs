//! Ordered query parameters and query-string encoding.

use serde_json::{Map, Value};

/// Query parameters in insertion order.
///
/// Values are JSON scalars; `null` entries are kept here but dropped when
/// the query string is built, so callers can pass optional filters through
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, Value)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_opt<K: Into<String>, V: Into<Value>>(self, key: K, value: Option<V>) -> Self {
        self.with(key, value.map_or(Value::Null, Into::into))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Percent-encoded `k=v&k=v` string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                encode_value(value).map(|value| {
                    format!(
                        "{}={}",
                        urlencoding::encode(key),
                        urlencoding::encode(&value)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl From<Map<String, Value>> for QueryParams {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| encode_value(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}
