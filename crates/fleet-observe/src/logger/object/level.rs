use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Validated `EnvFilter` expression.
///
/// The raw string is kept so the config can be written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter. Construction already validated the expression, so a
    /// failure here can only come from a changed `tracing-subscriber`; it falls back to `info`.
    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.as_str()).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        EnvFilter::try_new(&s)
            .map(|_| LoggerLevel(s.clone()))
            .map_err(|e| LoggerError::InvalidLevel(format!("{s}: {e}")))
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_directives() {
        for ok in ["info", "trace", "fleet_core=debug,info", "fleet_exec=trace,warn"] {
            assert!(ok.parse::<LoggerLevel>().is_ok(), "expected {ok} to parse");
        }
    }

    #[test]
    fn rejects_bad_levels() {
        for bad in ["fleet_core=loud", "a=trace,b=wat"] {
            assert!(bad.parse::<LoggerLevel>().is_err(), "expected {bad} to fail");
        }
    }

    #[test]
    fn default_is_info() {
        assert_eq!(LoggerLevel::default().as_str(), "info");
        let _ = LoggerLevel::default().to_env_filter();
    }

    #[test]
    fn serde_keeps_raw_string() {
        let lvl: LoggerLevel = serde_json::from_str(r#""fleet_core=trace,info""#).unwrap();
        assert_eq!(
            serde_json::to_string(&lvl).unwrap(),
            r#""fleet_core=trace,info""#
        );
    }
}
