mod app;
pub use app::AppContext;

mod map;
pub use map::{JobMap, Node, NodeFlags};

mod state;
pub use state::JobState;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Attributes, Flag, Nspace};

/// Per-job flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFlags {
    /// The job is being restarted; its daemons already exist.
    #[serde(default)]
    pub restart: Flag,
    /// The job only attaches debugger daemons to existing ones; nothing is spawned.
    #[serde(default)]
    pub debugger_daemon: Flag,
    /// Dry run: compute the map but do not launch anything.
    #[serde(default)]
    pub do_not_launch: Flag,
}

/// One submitted distributed execution request.
#[derive(Clone, Debug, Default)]
pub struct Job {
    pub nspace: Nspace,
    pub apps: Vec<AppContext>,
    pub map: Option<JobMap>,
    pub state: JobState,
    pub flags: JobFlags,
    pub attributes: Attributes,
    /// Reason recorded when the job entered a failure state.
    pub failure: Option<String>,
}

impl Job {
    pub fn new(nspace: Nspace) -> Self {
        Self {
            nspace,
            ..Self::default()
        }
    }

    pub fn with_app(mut self, app: AppContext) -> Self {
        self.apps.push(app);
        self
    }

    pub fn with_map(mut self, map: JobMap) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_flags(mut self, flags: JobFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// All jobs known to one process, plus which of them is the daemon job.
///
/// The daemon job is the launcher's own job object: its map lists every node that runs (or will run) a daemon.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: HashMap<Nspace, Job>,
    daemons: Option<Nspace>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job, replacing any job with the same namespace.
    pub fn insert(&mut self, job: Job) -> Option<Job> {
        self.jobs.insert(job.nspace.clone(), job)
    }

    /// Insert the daemon job and remember it as such.
    pub fn insert_daemons(&mut self, job: Job) {
        self.daemons = Some(job.nspace.clone());
        self.insert(job);
    }

    pub fn get(&self, nspace: &Nspace) -> Option<&Job> {
        self.jobs.get(nspace)
    }

    pub fn get_mut(&mut self, nspace: &Nspace) -> Option<&mut Job> {
        self.jobs.get_mut(nspace)
    }

    pub fn remove(&mut self, nspace: &Nspace) -> Option<Job> {
        if self.daemons.as_ref() == Some(nspace) {
            self.daemons = None;
        }
        self.jobs.remove(nspace)
    }

    pub fn daemons_nspace(&self) -> Option<&Nspace> {
        self.daemons.as_ref()
    }

    pub fn daemons(&self) -> Option<&Job> {
        self.jobs.get(self.daemons.as_ref()?)
    }

    pub fn daemons_mut(&mut self) -> Option<&mut Job> {
        let ns = self.daemons.as_ref()?;
        self.jobs.get_mut(ns)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
