use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ExecError;

use super::LogConfig;

/// How spawns are confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ConfirmMode {
    /// A successful fork/exec counts as started.
    #[default]
    Immediate,
    /// Wait `grace_ms`, then report a daemon that already exited non-zero as failed.
    #[serde(rename_all = "camelCase")]
    Poll { grace_ms: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalBackendConfig {
    pub confirm: ConfirmMode,
    /// Working directory for daemons. If `None`, inherits from the launcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    pub log: LogConfig,
}

impl LocalBackendConfig {
    /// Rules:
    /// - the poll grace period is not zero;
    /// - `cwd`, if set, is an existing directory.
    pub fn validate(&self) -> Result<(), ExecError> {
        if let ConfirmMode::Poll { grace_ms: 0 } = self.confirm {
            return Err(ExecError::InvalidConfig(
                "confirm.graceMs cannot be zero".into(),
            ));
        }
        if let Some(cwd) = &self.cwd {
            if !cwd.is_dir() {
                return Err(ExecError::InvalidConfig(format!(
                    "cwd {} is not a directory",
                    cwd.display()
                )));
            }
        }
        Ok(())
    }
}
