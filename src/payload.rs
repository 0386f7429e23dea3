//! Ordered JSON body builder for create/update requests.

use serde_json::Value;

/// Accumulates typed key/value pairs for a request body.
///
/// Keys keep their insertion order and are unique: writing a key again
/// replaces the earlier value in place. Keys that were never set are simply
/// absent from the serialized body — nothing is null-filled. Serialization
/// happens lazily at send time; building a payload performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    entries: Vec<(String, Value)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-chaining write used by the mutation engines.
    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    fn put(mut self, key: &str, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn put_str(self, key: &str, value: impl Into<String>) -> Self {
        self.put(key, Value::String(value.into()))
    }

    pub fn put_int(self, key: &str, value: i64) -> Self {
        self.put(key, Value::from(value))
    }

    pub fn put_bool(self, key: &str, value: bool) -> Self {
        self.put(key, Value::Bool(value))
    }

    pub fn put_str_list<I, S>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<Value> = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        self.put(key, Value::Array(list))
    }

    pub fn put_int_list<I>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let list: Vec<Value> = values.into_iter().map(Value::from).collect();
        self.put(key, Value::Array(list))
    }

    /// Set a nested JSON object (or any pre-built value) under `key`.
    pub fn put_object(self, key: &str, value: Value) -> Self {
        self.put(key, value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the current value for a key, if set.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Render the accumulated fields as a JSON object.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Serialize to the wire format.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }
}
