use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

use fleet_core::{LaunchConfig, NodeSpec};
use fleet_exec::local::LocalBackendConfig;
use fleet_model::{AppContext, JobFlags};
use fleet_observe::LoggerConfig;

/// Environment variable naming the config file when no path is given on the command line.
pub const ENV_CONFIG: &str = "FLEET_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackendSection {
    /// Launch module to use; the first available one when unset.
    pub name: Option<String>,
    pub local: LocalBackendConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LauncherConfig {
    pub logger: LoggerConfig,
    pub launch: LaunchConfig,
    pub backend: BackendSection,
    /// Node pool. Empty means a single local node.
    pub nodes: Vec<NodeSpec>,
    pub app: AppContext,
    pub flags: JobFlags,
    /// Keep daemons up this long before ordering them to exit; wait for Ctrl-C when unset.
    pub hold_ms: Option<u64>,
    /// Print prometheus metrics on exit.
    pub print_metrics: bool,
}

impl LauncherConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn nodes(&self) -> Vec<NodeSpec> {
        if self.nodes.is_empty() {
            return vec![NodeSpec {
                name: "localhost".into(),
                launch_id: 0,
            }];
        }
        self.nodes.clone()
    }
}
