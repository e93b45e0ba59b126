use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Env;

/// One application context of a job: what the daemons will eventually run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppContext {
    /// Executable to run.
    pub app: String,

    /// Arguments, not including the executable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub argv: Vec<String>,

    /// Environment entries added for the application.
    #[serde(default, skip_serializing_if = "Env::is_empty")]
    pub env: Env,

    /// Working directory. If `None`, inherits from the daemon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Number of processes requested.
    #[serde(default = "default_num_procs")]
    pub num_procs: u32,

    /// Installation prefix override: daemons get `{prefix}/bin` and `{prefix}/lib` prepended to their search paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_dir: Option<PathBuf>,
}

fn default_num_procs() -> u32 {
    1
}
