//! Virtual machine setup: decides which nodes get a daemon before the launch loop runs.
use serde::{Deserialize, Serialize};
use tracing::debug;

use fleet_model::{JobMap, JobRegistry, Node, Nspace, ProcName};

use crate::error::CoreError;

/// Prepares the daemon job's map for launching `nspace`.
pub trait VirtualMachine: Send + Sync {
    fn setup(&self, jobs: &mut JobRegistry, nspace: &Nspace) -> Result<(), CoreError>;
}

/// Uses the daemon map exactly as provided.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticVirtualMachine;

impl VirtualMachine for StaticVirtualMachine {
    fn setup(&self, jobs: &mut JobRegistry, _: &Nspace) -> Result<(), CoreError> {
        if jobs.daemons().is_none() {
            return Err(CoreError::NotFound("daemon job".into()));
        }
        Ok(())
    }
}

/// A node the launcher may place a daemon on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub name: String,
    /// Backend-specific launch target id.
    pub launch_id: i32,
}

/// Grows the daemon map to cover a fixed node pool.
///
/// Nodes already in the map are left alone; new ones get the next free daemon rank.
/// Rank 0 belongs to the launcher itself. The new-daemon count is recomputed from node flags.
#[derive(Debug, Clone, Default)]
pub struct PoolVirtualMachine {
    pool: Vec<NodeSpec>,
}

impl PoolVirtualMachine {
    pub fn new(pool: Vec<NodeSpec>) -> Self {
        Self { pool }
    }
}

impl VirtualMachine for PoolVirtualMachine {
    fn setup(&self, jobs: &mut JobRegistry, nspace: &Nspace) -> Result<(), CoreError> {
        let daemons = jobs
            .daemons_mut()
            .ok_or_else(|| CoreError::NotFound("daemon job".into()))?;
        let daemons_ns = daemons.nspace.clone();
        let map = daemons.map.get_or_insert_with(JobMap::new);

        // `None` once the rank space is used up.
        let mut next = map
            .nodes()
            .iter()
            .filter_map(|n| n.daemon.as_ref().map(|d| d.rank.0))
            .max()
            .map_or(Some(1), |r| r.checked_add(1));

        let mut added = 0usize;
        for spec in &self.pool {
            if map.contains(&spec.name) {
                continue;
            }
            let rank = next.ok_or_else(|| {
                CoreError::NotFound(format!("free daemon rank for node {}", spec.name))
            })?;
            map.push(
                Node::new(spec.name.clone())
                    .with_daemon(ProcName::new(daemons_ns.clone(), rank))
                    .with_launch_id(spec.launch_id),
            );
            next = rank.checked_add(1);
            added += 1;
        }
        map.recount();
        debug!(nspace = %nspace, added, total = map.len(), "virtual machine ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fleet_model::Job;

    use super::*;

    fn pool() -> Vec<NodeSpec> {
        ["n1", "n2", "n3"]
            .iter()
            .enumerate()
            .map(|(i, n)| NodeSpec {
                name: n.to_string(),
                launch_id: 100 + i as i32,
            })
            .collect()
    }

    #[test]
    fn pool_adds_missing_nodes_with_fresh_ranks() {
        let mut jobs = JobRegistry::new();
        jobs.insert_daemons(Job::new(Nspace::new("d@0")));

        PoolVirtualMachine::new(pool())
            .setup(&mut jobs, &Nspace::new("app@1"))
            .unwrap();

        let map = jobs.daemons().unwrap().map.as_ref().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.num_new_daemons(), 3);
        let ranks: Vec<u32> = map
            .nodes()
            .iter()
            .map(|n| n.daemon.as_ref().unwrap().rank.0)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(map.nodes()[2].launch_id(), Some(102));
    }

    #[test]
    fn pool_setup_is_idempotent() {
        let mut jobs = JobRegistry::new();
        jobs.insert_daemons(Job::new(Nspace::new("d@0")));
        let vm = PoolVirtualMachine::new(pool());

        vm.setup(&mut jobs, &Nspace::new("app@1")).unwrap();
        vm.setup(&mut jobs, &Nspace::new("app@2")).unwrap();

        assert_eq!(jobs.daemons().unwrap().map.as_ref().unwrap().len(), 3);
    }

    fn daemons_with_rank(rank: u32) -> JobRegistry {
        let ns = Nspace::new("d@0");
        let node = Node::new("n0").with_daemon(ProcName::new(ns.clone(), rank));
        let mut jobs = JobRegistry::new();
        jobs.insert_daemons(Job::new(ns).with_map(JobMap::from_nodes(vec![node])));
        jobs
    }

    #[test]
    fn pool_takes_the_last_rank() {
        let mut jobs = daemons_with_rank(u32::MAX - 1);
        let vm = PoolVirtualMachine::new(pool()[..1].to_vec());

        vm.setup(&mut jobs, &Nspace::new("app@1")).unwrap();

        let map = jobs.daemons().unwrap().map.as_ref().unwrap();
        assert_eq!(map.nodes()[1].daemon.as_ref().unwrap().rank.0, u32::MAX);
    }

    #[test]
    fn pool_fails_when_ranks_run_out() {
        let mut jobs = daemons_with_rank(u32::MAX);

        let err = PoolVirtualMachine::new(pool())
            .setup(&mut jobs, &Nspace::new("app@1"))
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(msg) if msg.contains("n1")));
        assert_eq!(jobs.daemons().unwrap().map.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn setup_without_daemon_job_fails() {
        let mut jobs = JobRegistry::new();
        let err = PoolVirtualMachine::new(pool())
            .setup(&mut jobs, &Nspace::new("app@1"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let err = StaticVirtualMachine
            .setup(&mut jobs, &Nspace::new("app@1"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
