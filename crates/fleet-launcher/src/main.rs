mod config;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::bail;
use tracing::{error, info, warn};

use fleet_core::{
    DaemonLauncher, LaunchContext, LaunchModule, ModuleRegistry, PlmModule, PoolVirtualMachine,
    StateMachine,
};
use fleet_exec::local::{LocalBackend, LocalComm};
use fleet_model::{Job, JobMap, JobState, Nspace};
use fleet_observe::{StateLogger, init_local_offset, init_logger};
use fleet_prometheus::PrometheusMetrics;

use crate::config::{ENV_CONFIG, LauncherConfig};

fn main() -> anyhow::Result<()> {
    // Before any thread exists.
    init_local_offset();

    let cfg = match config_path() {
        Some(path) => LauncherConfig::from_file(&path)?,
        None => LauncherConfig::default(),
    };
    init_logger(&cfg.logger)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cfg))
}

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
}

async fn run(cfg: LauncherConfig) -> anyhow::Result<()> {
    // 1) metrics + launch context
    let metrics = PrometheusMetrics::new()?;
    let ctx = LaunchContext::from_process(Arc::new(metrics.clone()));

    // 2) backend + module
    let backend = Arc::new(LocalBackend::new(cfg.backend.local.clone())?);
    let comm = Arc::new(LocalComm::new(backend.daemons()));
    let launcher = DaemonLauncher::new(backend, cfg.launch.clone(), ctx)
        .with_vm(Arc::new(PoolVirtualMachine::new(cfg.nodes())));

    let mut registry = ModuleRegistry::new();
    registry.register(Arc::new(PlmModule::new(launcher, comm)));
    let module = registry.select(cfg.backend.name.as_deref())?;

    // 3) state machine
    let mut machine = StateMachine::with_defaults();
    machine.add_subscriber(Arc::new(StateLogger));
    module.init(&mut machine).await?;

    let hnp = module.set_hnp_name();
    info!(hnp = %hnp, module = module.name(), "launcher ready");
    machine
        .jobs_mut()
        .insert_daemons(Job::new(hnp.nspace.clone()).with_map(JobMap::new()));

    // 4) job
    let job = Job::new(Nspace::generate("fleet", 1))
        .with_app(cfg.app.clone())
        .with_flags(cfg.flags);
    let nspace = job.nspace.clone();
    machine.submit(job.clone());
    module.launch_job(&job, &machine.activator())?;
    machine.run_until_idle().await;

    let (state, failure) = machine
        .jobs()
        .get(&nspace)
        .map(|j| (j.state, j.failure.clone()))
        .unwrap_or_default();

    if state == JobState::FailedToStart {
        module.finalize().await?;
        bail!(
            "job {nspace} failed to start: {}",
            failure.as_deref().unwrap_or("unknown")
        );
    }
    info!(nspace = %nspace, state = %state, "job launched");

    // 5) hold
    match cfg.hold_ms {
        Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        None => {
            info!("press Ctrl-C to stop the daemons");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C; stopping now");
            }
        }
    }

    // 6) teardown
    if let Err(e) = module.terminate_orteds().await {
        error!(error = %e, "failed to order daemons to exit");
    }
    module.finalize().await?;

    if cfg.print_metrics {
        println!("{}", metrics.encode_text()?);
    }
    Ok(())
}
