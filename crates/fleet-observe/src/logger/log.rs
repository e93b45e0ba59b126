use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
    object::LoggerRfc3339,
};

pub(crate) fn logger_text(cfg: &LoggerConfig) -> LoggerResult<()> {
    let layer = fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_timer(LoggerRfc3339::new(cfg.tz));

    install(
        tracing_subscriber::registry()
            .with(cfg.level.to_env_filter())
            .with(layer),
    )
}

pub(crate) fn logger_json(cfg: &LoggerConfig) -> LoggerResult<()> {
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(LoggerRfc3339::new(cfg.tz));

    install(
        tracing_subscriber::registry()
            .with(cfg.level.to_env_filter())
            .with(layer),
    )
}

#[cfg(target_os = "linux")]
pub(crate) fn logger_journald(cfg: &LoggerConfig) -> LoggerResult<()> {
    let layer =
        tracing_journald::layer().map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?;

    install(
        tracing_subscriber::registry()
            .with(cfg.level.to_env_filter())
            .with(layer),
    )
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn logger_journald(_: &LoggerConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

fn install<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}
