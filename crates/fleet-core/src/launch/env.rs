use std::path::Path;

use tracing::debug;

use fleet_model::{
    AppContext, ENV_DAEMON_UMASK, ENV_LAUNCHER_PAUSE_FOR_TOOL, ENV_LAUNCHER_RENDEZVOUS_FILE,
    ENV_LIBRARY_PATH, ENV_PATH, ENV_PLM, Env, PLM_DIRECT,
};

use crate::config::LaunchConfig;

/// Environment handed to every daemon of one launch.
///
/// Starts from `base` and then:
/// - drops tool-attach variables meant only for the launcher;
/// - pins daemons to the direct launch module;
/// - records the launcher's creation mask as an octal string with a leading `0`;
/// - with an installation prefix, prepends `{prefix}/{bin_dir}` to `PATH` and `{prefix}/{lib_dir}`
///   to the library path, but only when those variables are already set.
pub fn daemon_env(
    base: &Env,
    cfg: &LaunchConfig,
    app: Option<&AppContext>,
    umask: Option<u32>,
) -> Env {
    let mut env = base.clone();
    env.remove(ENV_LAUNCHER_PAUSE_FOR_TOOL);
    env.remove(ENV_LAUNCHER_RENDEZVOUS_FILE);

    env.set(ENV_PLM, PLM_DIRECT);
    if let Some(mask) = umask {
        env.set(ENV_DAEMON_UMASK, format!("0{mask:o}"));
    }

    if let Some(prefix) = app.and_then(|a| a.prefix_dir.as_deref()) {
        prepend_search_path(&mut env, ENV_PATH, prefix, &cfg.bin_dir);
        prepend_search_path(&mut env, ENV_LIBRARY_PATH, prefix, &cfg.lib_dir);
    }
    env
}

fn prepend_search_path(env: &mut Env, var: &str, prefix: &Path, dir: &str) {
    let Some(current) = env.get(var).map(str::to_owned) else {
        return;
    };
    let value = format!("{}:{current}", prefix.join(dir).display());
    debug!(var, value = %value, "reset search path");
    env.set(var, value);
}
