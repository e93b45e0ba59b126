use std::{
    os::unix::process::ExitStatusExt,
    process::{ExitStatus, Stdio},
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{process::Command, time::Instant};
use tracing::{debug, trace};

use fleet_core::{BackendError, SpawnBackend, SpawnHandle, SpawnStatus, daemon_name};
use fleet_model::{ENV_JOB_NSPACE, ENV_LAUNCH_ID, Env, Nspace};

use crate::{BACKEND_LOCAL, ExecError};

use super::{
    ConfirmMode, DaemonTable, LocalBackendConfig,
    daemons::LocalDaemon,
    logger::{Stream, forward_lines},
};

/// Starts daemons as local child processes.
///
/// The launch target id is exported to each daemon as `FLEET_LAUNCH_ID`; the daemon environment is
/// exactly the one handed to [`SpawnBackend::spawn`]. Each daemon is tagged with the name found on
/// its command line and the job named by `FLEET_JOB_NSPACE`, so directives can target it.
pub struct LocalBackend {
    cfg: LocalBackendConfig,
    daemons: DaemonTable,
    next: AtomicU64,
    connected: AtomicBool,
}

impl LocalBackend {
    pub fn new(cfg: LocalBackendConfig) -> Result<Self, ExecError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            daemons: DaemonTable::default(),
            next: AtomicU64::new(1),
            connected: AtomicBool::new(false),
        })
    }

    /// Shared view of the daemons this backend started.
    pub fn daemons(&self) -> DaemonTable {
        self.daemons.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|s| -s))
        .unwrap_or(-1)
}

#[async_trait]
impl SpawnBackend for LocalBackend {
    fn name(&self) -> &'static str {
        BACKEND_LOCAL
    }

    fn requires_poll(&self) -> bool {
        matches!(self.cfg.confirm, ConfirmMode::Poll { .. })
    }

    async fn connect(&self) -> Result<(), BackendError> {
        self.connected.store(true, Ordering::SeqCst);
        trace!("local backend ready");
        Ok(())
    }

    async fn spawn(
        &self,
        argv: &[String],
        env: &Env,
        launch_id: i32,
    ) -> Result<SpawnHandle, BackendError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(BackendError::Spawn("empty argv".into()));
        };
        if !self.is_connected() {
            return Err(BackendError::Spawn("backend not connected".into()));
        }

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(env.iter().map(|kv| (kv.key(), kv.value())))
            .env(ENV_LAUNCH_ID, launch_id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cfg.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| BackendError::Spawn(format!("{program}: {e}")))?;
        if let Some(out) = child.stdout.take() {
            tokio::spawn(forward_lines(out, launch_id, Stream::Stdout, self.cfg.log));
        }
        if let Some(err) = child.stderr.take() {
            tokio::spawn(forward_lines(err, launch_id, Stream::Stderr, self.cfg.log));
        }

        let id = self.next.fetch_add(1, Ordering::SeqCst);
        debug!(id, launch_id, pid = ?child.id(), program = %program, "daemon process started");
        let daemon = LocalDaemon {
            launch_id,
            child,
            started: Instant::now(),
            name: daemon_name(argv),
            job: env.get(ENV_JOB_NSPACE).map(Nspace::new),
        };
        self.daemons.with(|m| m.insert(id, daemon));
        Ok(SpawnHandle::new(id, launch_id))
    }

    async fn poll(&self, handle: &SpawnHandle) -> Result<SpawnStatus, BackendError> {
        if let ConfirmMode::Poll { grace_ms } = self.cfg.confirm {
            let started = self
                .daemons
                .with(|m| m.get(&handle.id()).map(|d| d.started))
                .ok_or(BackendError::UnknownHandle(handle.id()))?;
            tokio::time::sleep_until(started + Duration::from_millis(grace_ms)).await;
        }

        let exited = self.daemons.with(|m| {
            let daemon = m
                .get_mut(&handle.id())
                .ok_or(BackendError::UnknownHandle(handle.id()))?;
            daemon.child.try_wait().map_err(BackendError::from)
        })?;

        match exited {
            None => Ok(SpawnStatus::Started),
            Some(status) if status.success() => {
                debug!(launch_id = handle.launch_id(), "daemon already exited cleanly");
                Ok(SpawnStatus::Started)
            }
            Some(status) => Ok(SpawnStatus::Failed {
                code: exit_code(status),
            }),
        }
    }

    async fn disconnect(&self) -> Result<(), BackendError> {
        self.daemons.kill_all();
        self.connected.store(false, Ordering::SeqCst);
        trace!("local backend closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_backend() -> LocalBackend {
        LocalBackend::new(LocalBackendConfig {
            confirm: ConfirmMode::Poll { grace_ms: 300 },
            ..Default::default()
        })
        .unwrap()
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["/bin/sh".into(), "-c".into(), script.into()]
    }

    fn base_env() -> Env {
        let mut env = Env::new();
        env.push("PATH", "/usr/bin:/bin");
        env
    }

    #[tokio::test]
    async fn spawn_requires_connect() {
        let b = poll_backend();
        match b.spawn(&sh("true"), &base_env(), 1).await {
            Err(BackendError::Spawn(msg)) => assert!(msg.contains("not connected")),
            other => panic!("expected spawn rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_argv_is_rejected() {
        let b = poll_backend();
        b.connect().await.unwrap();
        assert!(matches!(
            b.spawn(&[], &base_env(), 1).await,
            Err(BackendError::Spawn(_))
        ));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let b = poll_backend();
        b.connect().await.unwrap();
        let argv = vec!["/definitely/not/fleetd".to_string()];
        match b.spawn(&argv, &base_env(), 1).await {
            Err(BackendError::Spawn(msg)) => assert!(msg.contains("/definitely/not/fleetd")),
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn daemon_sees_exact_env_and_launch_id() {
        let b = poll_backend();
        b.connect().await.unwrap();
        let mut env = base_env();
        env.push("FOO", "bar");

        let script = r#"[ "$FLEET_LAUNCH_ID" = 7 ] && [ "$FOO" = bar ] && [ -z "$HOME" ] || exit 9"#;
        let h = b.spawn(&sh(script), &env, 7).await.unwrap();

        assert_eq!(h.launch_id(), 7);
        assert_eq!(b.poll(&h).await.unwrap(), SpawnStatus::Started);
    }

    #[tokio::test]
    async fn early_non_zero_exit_is_reported() {
        let b = poll_backend();
        b.connect().await.unwrap();
        let h = b.spawn(&sh("exit 3"), &base_env(), 1).await.unwrap();

        assert_eq!(b.poll(&h).await.unwrap(), SpawnStatus::Failed { code: 3 });
    }

    #[tokio::test]
    async fn running_daemon_is_started_and_killed_on_disconnect() {
        let b = poll_backend();
        b.connect().await.unwrap();
        let h = b.spawn(&sh("sleep 30"), &base_env(), 1).await.unwrap();

        assert_eq!(b.poll(&h).await.unwrap(), SpawnStatus::Started);
        assert_eq!(b.daemons().len(), 1);

        b.disconnect().await.unwrap();
        assert!(b.daemons().is_empty());
        assert!(!b.is_connected());
    }

    #[tokio::test]
    async fn grace_period_runs_from_spawn_time() {
        let b = poll_backend();
        b.connect().await.unwrap();
        let mut handles = Vec::new();
        for id in 1..=3 {
            handles.push(b.spawn(&sh("sleep 30"), &base_env(), id).await.unwrap());
        }

        let begin = Instant::now();
        for h in &handles {
            assert_eq!(b.poll(h).await.unwrap(), SpawnStatus::Started);
        }
        assert!(begin.elapsed() < Duration::from_millis(750));

        b.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn daemon_identity_comes_from_argv_and_env() {
        let b = poll_backend();
        b.connect().await.unwrap();
        let mut argv = sh("sleep 30");
        argv.extend(["fleetd", "--nspace", "d@0", "--rank", "2"].map(String::from));
        let mut env = base_env();
        env.push(ENV_JOB_NSPACE, "app@1");
        b.spawn(&argv, &env, 1).await.unwrap();

        let d = b.daemons();
        assert_eq!(d.pids_where(|d| d.serves(&Nspace::new("app@1"))).len(), 1);
        assert_eq!(d.pids_where(|d| d.serves(&Nspace::new("d@0"))).len(), 1);
        assert!(d.pids_where(|d| d.serves(&Nspace::new("other@3"))).is_empty());

        b.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_handle_is_an_error() {
        let b = poll_backend();
        assert!(matches!(
            b.poll(&SpawnHandle::new(99, 1)).await,
            Err(BackendError::UnknownHandle(99))
        ));
    }

    #[test]
    fn immediate_mode_needs_no_poll() {
        let b = LocalBackend::new(LocalBackendConfig::default()).unwrap();
        assert!(!b.requires_poll());
        assert!(poll_backend().requires_poll());
    }
}
