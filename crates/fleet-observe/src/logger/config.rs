use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::object::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Logger configuration, as found under `logger` in the launcher config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"fleet_core=debug,info"`.
    pub level: LoggerLevel,
    /// Timezone of the timestamps.
    pub tz: LoggerTimeZone,
    /// Print the module path of each event.
    pub with_targets: bool,
    /// Colored text output; only honored on a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Color is used only when enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
