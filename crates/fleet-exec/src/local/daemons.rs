use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::{process::Child, time::Instant};
use tracing::{debug, warn};

use fleet_model::{Nspace, ProcName};

use crate::{ExecError, send_signal};

pub(crate) struct LocalDaemon {
    pub(crate) launch_id: i32,
    pub(crate) child: Child,
    pub(crate) started: Instant,
    /// Daemon identity, when its command line carries one.
    pub(crate) name: Option<ProcName>,
    /// Job whose launch started the daemon.
    pub(crate) job: Option<Nspace>,
}

impl LocalDaemon {
    /// Whether the daemon serves `nspace`, either as its own job or as the job it was launched for.
    pub(crate) fn serves(&self, nspace: &Nspace) -> bool {
        self.job.as_ref() == Some(nspace) || self.name.as_ref().is_some_and(|n| &n.nspace == nspace)
    }
}

/// Daemons started by a [`super::LocalBackend`], shared with its [`super::LocalComm`].
#[derive(Clone, Default)]
pub struct DaemonTable {
    inner: Arc<Mutex<HashMap<u64, LocalDaemon>>>,
}

impl DaemonTable {
    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut HashMap<u64, LocalDaemon>) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn len(&self) -> usize {
        self.with(|m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// OS pids of daemons that are still running.
    pub fn pids(&self) -> Vec<u32> {
        self.pids_where(|_| true)
    }

    /// OS pids of running daemons matching `pred`.
    pub(crate) fn pids_where(&self, pred: impl Fn(&LocalDaemon) -> bool) -> Vec<u32> {
        self.with(|m| {
            m.values()
                .filter(|d| pred(d))
                .filter_map(|d| d.child.id())
                .collect()
        })
    }

    /// Deliver `signal` to every running daemon. Returns how many were signalled.
    pub fn signal_all(&self, signal: i32) -> Result<usize, ExecError> {
        self.signal_pids(&self.pids(), signal)
    }

    /// Deliver `signal` to each of `pids`.
    ///
    /// Every pid is tried; the last delivery error, if any, is returned.
    pub(crate) fn signal_pids(&self, pids: &[u32], signal: i32) -> Result<usize, ExecError> {
        let mut delivered = 0;
        let mut last_err = None;
        for &pid in pids {
            match send_signal(pid, signal) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(pid, signal, error = %e, "signal delivery failed");
                    last_err = Some(e);
                }
            }
        }
        debug!(signal, delivered, "signal delivered to local daemons");
        match last_err {
            Some(e) => Err(e),
            None => Ok(delivered),
        }
    }

    /// Kill and forget every daemon.
    pub fn kill_all(&self) {
        self.with(|m| {
            for (_, mut d) in m.drain() {
                if let Err(e) = d.child.start_kill() {
                    debug!(launch_id = d.launch_id, error = %e, "daemon already gone");
                }
            }
        })
    }
}
