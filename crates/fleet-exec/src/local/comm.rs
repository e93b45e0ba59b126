use async_trait::async_trait;
use tracing::{debug, warn};

use fleet_core::{CoreError, DaemonComm, Directive, DirectiveKind};
use fleet_model::ProcName;

use super::DaemonTable;

/// Reaches local daemons through OS signals.
///
/// - exit: `SIGTERM` to every daemon;
/// - signal: the requested signal number, unchanged, to the daemons serving the directive's job;
/// - kill: `SIGKILL` to the daemons named in the directive.
///
/// A signal or kill whose targets cannot all be matched to running daemons fails with
/// [`CoreError::Comm`] and signals nothing.
pub struct LocalComm {
    daemons: DaemonTable,
}

impl LocalComm {
    pub fn new(daemons: DaemonTable) -> Self {
        Self { daemons }
    }
}

#[async_trait]
impl DaemonComm for LocalComm {
    async fn broadcast(&self, directive: Directive) -> Result<(), CoreError> {
        let (pids, signal) = match directive.kind() {
            Some(DirectiveKind::Exit) => (self.daemons.pids(), libc::SIGTERM),
            Some(DirectiveKind::SignalLocalProcs) => {
                let signal = directive
                    .signal_number()
                    .ok_or_else(|| CoreError::Comm("signal directive without a signal".into()))?;
                (self.serving_job(&directive)?, signal)
            }
            Some(DirectiveKind::KillLocalProcs) => (self.named(&directive.procs())?, libc::SIGKILL),
            None => {
                warn!("directive without a command ignored");
                return Ok(());
            }
        };
        self.daemons.signal_pids(&pids, signal)?;
        Ok(())
    }
}

impl LocalComm {
    fn serving_job(&self, directive: &Directive) -> Result<Vec<u32>, CoreError> {
        let nspace = directive
            .nspace()
            .ok_or_else(|| CoreError::Comm("signal directive without a job".into()))?;
        let pids = self.daemons.pids_where(|d| d.serves(&nspace));
        if pids.is_empty() {
            return Err(CoreError::Comm(format!("no local daemon serves job {nspace}")));
        }
        Ok(pids)
    }

    fn named(&self, procs: &[ProcName]) -> Result<Vec<u32>, CoreError> {
        let mut pids = Vec::with_capacity(procs.len());
        for proc in procs {
            let found = self
                .daemons
                .pids_where(|d| d.name.as_ref() == Some(proc));
            if found.is_empty() {
                return Err(CoreError::Comm(format!("no local daemon named {proc}")));
            }
            pids.extend(found);
        }
        debug!(procs = procs.len(), daemons = pids.len(), "killing local daemons");
        Ok(pids)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fleet_core::{SpawnBackend, SpawnHandle, SpawnStatus};
    use fleet_model::{ENV_JOB_NSPACE, Env, Nspace};

    use super::*;
    use crate::local::{ConfirmMode, LocalBackend, LocalBackendConfig};

    fn backend() -> LocalBackend {
        LocalBackend::new(LocalBackendConfig {
            confirm: ConfirmMode::Poll { grace_ms: 200 },
            ..Default::default()
        })
        .unwrap()
    }

    /// Start a daemon of job `app@1` named `fleet-d@0` rank `rank`.
    async fn start(b: &LocalBackend, script: &str, rank: u32) -> SpawnHandle {
        let mut env = Env::new();
        env.push("PATH", "/usr/bin:/bin");
        env.push(ENV_JOB_NSPACE, "app@1");
        let argv = [
            "/bin/sh", "-c", script, "fleetd", "--nspace", "fleet-d@0", "--rank",
        ]
        .map(String::from)
        .into_iter()
        .chain([rank.to_string()])
        .collect::<Vec<_>>();
        b.spawn(&argv, &env, rank as i32).await.unwrap()
    }

    async fn running(script: &str) -> (LocalBackend, SpawnHandle) {
        let b = backend();
        b.connect().await.unwrap();
        let h = start(&b, script, 1).await;
        (b, h)
    }

    fn daemon(rank: u32) -> ProcName {
        ProcName::new(Nspace::new("fleet-d@0"), rank)
    }

    #[tokio::test]
    async fn exit_directive_terminates_daemons() {
        let (b, h) = running("sleep 30").await;
        let comm = LocalComm::new(b.daemons());

        comm.broadcast(Directive::exit()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            b.poll(&h).await.unwrap(),
            SpawnStatus::Failed {
                code: -libc::SIGTERM
            }
        );
    }

    #[tokio::test]
    async fn signal_directive_delivers_requested_number() {
        let (b, h) = running("trap 'exit 42' USR1; while :; do sleep 0.05; done").await;
        // Let the shell install its trap.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let comm = LocalComm::new(b.daemons());

        comm.broadcast(Directive::signal(&Nspace::new("app@1"), libc::SIGUSR1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(b.poll(&h).await.unwrap(), SpawnStatus::Failed { code: 42 });
    }

    #[tokio::test]
    async fn signal_for_another_job_reaches_no_daemon() {
        let (b, h) = running("sleep 30").await;
        let comm = LocalComm::new(b.daemons());

        let err = comm
            .broadcast(Directive::signal(&Nspace::new("other@2"), libc::SIGTERM))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Comm(msg) if msg.contains("other@2")));
        assert_eq!(b.poll(&h).await.unwrap(), SpawnStatus::Started);

        b.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn kill_reaches_only_the_named_daemon() {
        let b = backend();
        b.connect().await.unwrap();
        let one = start(&b, "sleep 30", 1).await;
        let two = start(&b, "sleep 30", 2).await;
        let comm = LocalComm::new(b.daemons());

        comm.broadcast(Directive::kill(&[daemon(2)])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(b.poll(&one).await.unwrap(), SpawnStatus::Started);
        assert_eq!(
            b.poll(&two).await.unwrap(),
            SpawnStatus::Failed {
                code: -libc::SIGKILL
            }
        );

        b.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn kill_of_unknown_proc_leaves_daemons_running() {
        let b = backend();
        b.connect().await.unwrap();
        let one = start(&b, "sleep 30", 1).await;
        let two = start(&b, "sleep 30", 2).await;
        let comm = LocalComm::new(b.daemons());

        let stranger = ProcName::new(Nspace::new("other@9"), 5);
        let err = comm
            .broadcast(Directive::kill(&[daemon(1), stranger]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Comm(msg) if msg.contains("other@9")));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(b.poll(&one).await.unwrap(), SpawnStatus::Started);
        assert_eq!(b.poll(&two).await.unwrap(), SpawnStatus::Started);

        b.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn empty_kill_list_signals_nothing() {
        let (b, h) = running("sleep 30").await;
        let comm = LocalComm::new(b.daemons());

        comm.broadcast(Directive::kill(&[])).await.unwrap();
        assert_eq!(b.poll(&h).await.unwrap(), SpawnStatus::Started);

        b.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn empty_directive_is_ignored() {
        let comm = LocalComm::new(Default::default());
        comm.broadcast(Directive::default()).await.unwrap();
    }
}
