use serde::{Deserialize, Serialize};

use crate::KeyValue;

/// Ordered list of environment variables.
///
/// Stored as key–value pairs and serialized as a transparent array.
/// Lookups resolve to the last matching entry, so later entries override earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(pub Vec<KeyValue>);

impl Env {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Snapshot of the current process environment.
    ///
    /// Variables that are not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self(
            std::env::vars_os()
                .filter_map(|(k, v)| Some(KeyValue::new(k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        )
    }

    /// Build an environment from `envp`-style `KEY=VALUE` entries, skipping malformed ones.
    pub fn from_envp<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .filter_map(|e| KeyValue::parse(e.as_ref()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all key–value pairs.
    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Get the value for a key, returning the last matching entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key() == key)
            .map(|kv| kv.value())
    }

    /// Append a key–value pair. Later entries override earlier ones in [`Env::get`].
    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(KeyValue::new(key, value));
    }

    /// Overwrite the effective entry for `key` in place, or append it if absent.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        match self.0.iter_mut().rev().find(|kv| kv.key() == key) {
            Some(kv) => kv.set_value(value),
            None => self.0.push(KeyValue::new(key, value)),
        }
    }

    /// Remove every entry for `key`. Returns `true` if anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|kv| kv.key() != key);
        before != self.0.len()
    }

    /// Render as `envp`-style `KEY=VALUE` strings in insertion order.
    pub fn to_envp(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}
