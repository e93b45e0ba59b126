use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use super::LoggerTimeZone;

/// RFC3339 timestamps in the configured timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerRfc3339 {
    tz: LoggerTimeZone,
}

impl LoggerRfc3339 {
    pub fn new(tz: LoggerTimeZone) -> Self {
        Self { tz }
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.tz.offset())
    }
}

impl FormatTime for LoggerRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self.now().format(&Rfc3339) {
            Ok(ts) => write!(w, "{ts} "),
            Err(_) => write!(w, "<invalid-time> "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_timestamps_end_in_z() {
        let ts = LoggerRfc3339::new(LoggerTimeZone::Utc)
            .now()
            .format(&Rfc3339)
            .unwrap();
        assert!(ts.ends_with('Z'), "unexpected timestamp {ts}");
    }
}
