mod config;
mod error;
mod log;
mod object;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerRfc3339, LoggerTimeZone, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// With [`LoggerTimeZone::Local`], call [`init_local_offset`] from `main` before any thread is spawned;
/// otherwise timestamps fall back to UTC.
///
/// # Examples
/// ```rust
/// use fleet_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}
