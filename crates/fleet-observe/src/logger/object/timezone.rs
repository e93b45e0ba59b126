use std::{
    fmt,
    str::FromStr,
    sync::{OnceLock, RwLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::UtcOffset;

use crate::logger::LoggerError;

static LOCAL_OFFSET: RwLock<UtcOffset> = RwLock::new(UtcOffset::UTC);
static DETECTED: OnceLock<()> = OnceLock::new();

/// Timezone of log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggerTimeZone {
    #[default]
    Utc,
    /// System timezone, as detected by [`init_local_offset`].
    Local,
}

impl LoggerTimeZone {
    /// Offset to apply to UTC timestamps.
    pub fn offset(&self) -> UtcOffset {
        match self {
            LoggerTimeZone::Utc => UtcOffset::UTC,
            LoggerTimeZone::Local => local_offset(),
        }
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        })
    }
}

impl Serialize for LoggerTimeZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LoggerTimeZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Detect the local UTC offset.
///
/// Must run in `main` before the tokio runtime starts: most Unix platforms refuse
/// offset detection once the process has several threads. Falls back to UTC.
pub fn init_local_offset() {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    if let Ok(mut guard) = LOCAL_OFFSET.write() {
        *guard = offset;
    }
    let _ = DETECTED.set(());
}

fn local_offset() -> UtcOffset {
    DETECTED.get_or_init(|| {
        if let Ok(offset) = UtcOffset::current_local_offset() {
            if let Ok(mut guard) = LOCAL_OFFSET.write() {
                *guard = offset;
            }
        }
    });
    LOCAL_OFFSET.read().map(|g| *g).unwrap_or(UtcOffset::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("UTC".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Utc);
        assert_eq!("Local".parse::<LoggerTimeZone>().unwrap(), LoggerTimeZone::Local);
        assert!("pst".parse::<LoggerTimeZone>().is_err());
    }

    #[test]
    fn serde_writes_lowercase_reads_any_case() {
        assert_eq!(serde_json::to_string(&LoggerTimeZone::Local).unwrap(), r#""local""#);
        let tz: LoggerTimeZone = serde_json::from_str(r#""UTC""#).unwrap();
        assert_eq!(tz, LoggerTimeZone::Utc);
    }

    #[test]
    fn utc_offset_is_zero() {
        assert_eq!(LoggerTimeZone::Utc.offset(), UtcOffset::UTC);
    }

    #[test]
    fn local_offset_is_sane() {
        init_local_offset();
        assert!(LoggerTimeZone::Local.offset().whole_hours().abs() <= 14);
    }
}
