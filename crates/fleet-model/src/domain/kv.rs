use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment entry `KEY=VALUE`.
///
/// Both fields are plain UTF-8 strings; the key is never empty when parsed from an `envp` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    key: String,
    value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse an `envp`-style `KEY=VALUE` entry. Splits on the first `=`.
    pub fn parse(entry: &str) -> Option<Self> {
        let (key, value) = entry.split_once('=')?;
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, keeping the key.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl From<(&str, &str)> for KeyValue {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}
