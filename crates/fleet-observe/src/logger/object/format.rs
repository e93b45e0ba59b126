use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::logger::LoggerError;

/// Where and how log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoggerFormat {
    /// Human-readable text on stdout.
    #[default]
    Text,
    /// One JSON object per line on stdout.
    Json,
    /// systemd-journald (Linux only).
    Journald,
}

impl LoggerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            #[cfg(target_os = "linux")]
            "journald" | "journal" => Ok(Self::Journald),
            #[cfg(not(target_os = "linux"))]
            "journald" | "journal" => Err(LoggerError::JournaldNotSupported),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LoggerFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoggerFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("TEXT".parse::<LoggerFormat>().unwrap(), LoggerFormat::Text);
        assert_eq!(" Json ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn journal_alias_on_linux() {
        assert_eq!("journal".parse::<LoggerFormat>().unwrap(), LoggerFormat::Journald);
    }

    #[test]
    fn rejects_unknown_formats() {
        for bad in ["", "xml", "logfmt", "text-json"] {
            assert!(
                bad.parse::<LoggerFormat>().is_err(),
                "expected error for {bad:?}"
            );
        }
    }

    #[test]
    fn serde_uses_canonical_names() {
        assert_eq!(serde_json::to_string(&LoggerFormat::Json).unwrap(), r#""json""#);
        let parsed: LoggerFormat = serde_json::from_str(r#""Text""#).unwrap();
        assert_eq!(parsed, LoggerFormat::Text);
    }
}
